//! # Dispatcher d'actions SOAP
//!
//! Cœur du plan de contrôle : reçoit les [`ActionRequest`] extraites des
//! POST SOAP, les route vers le bon service, valide les arguments, appelle
//! le backend de lecture et produit soit une réponse typée (arguments OUT
//! ordonnés), soit un [`ActionFault`] numéroté.
//!
//! ## Sérialisation
//!
//! Chaque action s'exécute sous l'unique mutex du [`RendererState`] :
//! lecture de l'état, décision, appel du player et écriture de l'état
//! forment un bloc atomique vis-à-vis des autres control points. Les
//! appels au player peuvent bloquer brièvement pendant une négociation
//! d'état du pipeline ; c'est accepté, la latence du plan de contrôle
//! domine et les transitions déchirées sont impossibles.

use crate::avtransport;
use crate::connectionmanager;
use crate::renderingcontrol;
use crate::state::RendererState;
use grplayer::PlayerBackend;
use grupnp::gena::GenaServices;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// ServiceID des trois services du MediaRenderer.
pub const SERVICE_ID_AVTRANSPORT: &str = "urn:upnp-org:serviceId:AVTransport";
pub const SERVICE_ID_RENDERINGCONTROL: &str = "urn:upnp-org:serviceId:RenderingControl";
pub const SERVICE_ID_CONNECTIONMANAGER: &str = "urn:upnp-org:serviceId:ConnectionManager";

/// Types des trois services du MediaRenderer.
pub const SERVICE_TYPE_AVTRANSPORT: &str = "urn:schemas-upnp-org:service:AVTransport:1";
pub const SERVICE_TYPE_RENDERINGCONTROL: &str = "urn:schemas-upnp-org:service:RenderingControl:1";
pub const SERVICE_TYPE_CONNECTIONMANAGER: &str = "urn:schemas-upnp-org:service:ConnectionManager:1";

/// Requête d'action reçue du substrat SOAP.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// ServiceID complet (ex: "urn:upnp-org:serviceId:AVTransport")
    pub service_id: String,

    /// Nom de l'action (ex: "Play")
    pub action_name: String,

    /// Arguments IN (nom -> valeur)
    pub args: HashMap<String, String>,
}

impl ActionRequest {
    /// Accès à un argument, `None` si absent.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }
}

/// Réponse d'action : arguments OUT dans l'ordre de déclaration.
#[derive(Debug, Clone)]
pub struct ActionResponse {
    /// Type du service répondant (pour le xmlns de la réponse SOAP)
    pub service_type: String,

    /// Nom de l'action
    pub action_name: String,

    /// Arguments OUT ordonnés
    pub out_args: Vec<(String, String)>,
}

/// Fault UPnP numéroté (codes 700..715 du renderer).
#[derive(Debug, Clone, thiserror::Error)]
#[error("UPnP error {code}: {message}")]
pub struct ActionFault {
    pub code: u16,
    pub message: String,
}

impl ActionFault {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        let fault = Self {
            code,
            message: message.into(),
        };
        error!("Action error [{}]: {}", fault.code, fault.message);
        fault
    }
}

/// Pont vers les stores d'événements GENA des services.
///
/// Les changements de variables sont poussés après chaque action réussie ;
/// un renderer sans abonnés ne paie rien.
#[derive(Clone, Default)]
pub struct EventSink {
    services: Option<GenaServices>,
}

impl EventSink {
    pub fn new(services: GenaServices) -> Self {
        Self {
            services: Some(services),
        }
    }

    /// Enregistre un changement de variable pour un service.
    pub fn push(&self, service: &str, variable: &str, value: impl Into<String>) {
        if let Some(ref services) = self.services {
            if let Some(store) = services.get(service) {
                store.variable_changed(variable, value.into());
            }
        }
    }
}

/// Dispatcher d'actions du MediaRenderer.
pub struct SoapDispatcher {
    state: Mutex<RendererState>,
    player: Arc<dyn PlayerBackend>,
    events: EventSink,
}

impl SoapDispatcher {
    /// Crée le dispatcher autour du backend et de l'état initial.
    pub fn new(player: Arc<dyn PlayerBackend>, initial_volume: u32) -> Self {
        Self {
            state: Mutex::new(RendererState::new(initial_volume)),
            player,
            events: EventSink::default(),
        }
    }

    /// Raccorde les stores GENA (notification des changements d'état).
    pub fn with_events(mut self, events: GenaServices) -> Self {
        self.events = EventSink::new(events);
        self
    }

    /// Copie de l'état courant (introspection, tests).
    pub fn state_snapshot(&self) -> RendererState {
        self.state.lock().clone()
    }

    /// Traite une action et produit la réponse ou le fault.
    ///
    /// Toute la séquence lecture → décision → appel player → écriture se
    /// déroule sous le mutex du renderer.
    pub fn dispatch(&self, request: &ActionRequest) -> Result<ActionResponse, ActionFault> {
        let service_type = match request.service_id.as_str() {
            SERVICE_ID_AVTRANSPORT => SERVICE_TYPE_AVTRANSPORT,
            SERVICE_ID_RENDERINGCONTROL => SERVICE_TYPE_RENDERINGCONTROL,
            SERVICE_ID_CONNECTIONMANAGER => SERVICE_TYPE_CONNECTIONMANAGER,
            other => {
                error!("Unknown service ID: {}", other);
                return Err(ActionFault::new(700, "Unknown service"));
            }
        };

        let mut state = self.state.lock();

        let out_args = match request.service_id.as_str() {
            SERVICE_ID_AVTRANSPORT => {
                avtransport::handle(&mut state, self.player.as_ref(), &self.events, request)?
            }
            SERVICE_ID_RENDERINGCONTROL => {
                renderingcontrol::handle(&mut state, self.player.as_ref(), &self.events, request)?
            }
            _ => connectionmanager::handle(request)?,
        };

        Ok(ActionResponse {
            service_type: service_type.to_string(),
            action_name: request.action_name.clone(),
            out_args,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::TransportState;
    use grplayer::PlayerError;

    /// Backend scripté pour exercer le dispatcher sans GStreamer.
    #[derive(Default)]
    pub struct FakePlayer {
        pub inner: Mutex<FakeInner>,
    }

    #[derive(Default)]
    pub struct FakeInner {
        pub playing: bool,
        pub paused: bool,
        pub uri: String,
        pub volume: u32,
        pub muted: bool,
        pub position: (i64, i64),
        pub seek_target: Option<u64>,
        pub fail_play: bool,
        pub fail_seek: bool,
        pub fail_volume: bool,
    }

    impl PlayerBackend for FakePlayer {
        fn play(&self, uri: &str) -> Result<(), PlayerError> {
            let mut inner = self.inner.lock();
            if inner.fail_play {
                return Err(PlayerError::StateChange("scripted failure".to_string()));
            }
            inner.uri = uri.to_string();
            inner.playing = true;
            inner.paused = false;
            Ok(())
        }

        fn pause(&self) -> Result<(), PlayerError> {
            let mut inner = self.inner.lock();
            if !inner.playing {
                return Err(PlayerError::WrongState {
                    action: "pause",
                    reason: "not playing",
                });
            }
            inner.paused = true;
            Ok(())
        }

        fn resume(&self) -> Result<(), PlayerError> {
            let mut inner = self.inner.lock();
            if !inner.paused {
                return Err(PlayerError::WrongState {
                    action: "resume",
                    reason: "not paused",
                });
            }
            inner.paused = false;
            inner.playing = true;
            Ok(())
        }

        fn stop(&self) -> Result<(), PlayerError> {
            let mut inner = self.inner.lock();
            inner.playing = false;
            inner.paused = false;
            Ok(())
        }

        fn seek(&self, seconds: u64) -> Result<(), PlayerError> {
            let mut inner = self.inner.lock();
            if inner.fail_seek {
                return Err(PlayerError::SeekFailed { seconds });
            }
            inner.seek_target = Some(seconds);
            inner.position.0 = seconds as i64;
            Ok(())
        }

        fn position(&self) -> (i64, i64) {
            self.inner.lock().position
        }

        fn volume(&self) -> u32 {
            self.inner.lock().volume
        }

        fn set_volume(&self, percent: u32) -> Result<(), PlayerError> {
            let mut inner = self.inner.lock();
            if inner.fail_volume {
                return Err(PlayerError::StateChange("scripted failure".to_string()));
            }
            inner.volume = percent.min(100);
            inner.muted = percent == 0;
            Ok(())
        }

        fn mute(&self) -> bool {
            self.inner.lock().muted
        }

        fn set_mute(&self, mute: bool) -> Result<(), PlayerError> {
            self.inner.lock().muted = mute;
            Ok(())
        }

        fn is_playing(&self) -> bool {
            let inner = self.inner.lock();
            inner.playing && !inner.paused
        }

        fn is_paused(&self) -> bool {
            self.inner.lock().paused
        }
    }

    pub fn dispatcher() -> (SoapDispatcher, Arc<FakePlayer>) {
        let player = Arc::new(FakePlayer::default());
        let dispatcher = SoapDispatcher::new(player.clone(), 50);
        (dispatcher, player)
    }

    pub fn avt(action: &str, args: &[(&str, &str)]) -> ActionRequest {
        request(SERVICE_ID_AVTRANSPORT, action, args)
    }

    pub fn rc(action: &str, args: &[(&str, &str)]) -> ActionRequest {
        request(SERVICE_ID_RENDERINGCONTROL, action, args)
    }

    pub fn request(service_id: &str, action: &str, args: &[(&str, &str)]) -> ActionRequest {
        ActionRequest {
            service_id: service_id.to_string(),
            action_name: action.to_string(),
            args: args
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn out<'a>(response: &'a ActionResponse, name: &str) -> &'a str {
        response
            .out_args
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing out-arg {name}"))
    }

    #[test]
    fn test_unknown_service_is_700() {
        let (dispatcher, _) = dispatcher();
        let fault = dispatcher
            .dispatch(&request("urn:upnp-org:serviceId:Nope", "Play", &[]))
            .unwrap_err();
        assert_eq!(fault.code, 700);
    }

    #[test]
    fn test_unknown_action_is_709() {
        let (dispatcher, _) = dispatcher();
        let fault = dispatcher.dispatch(&avt("FooBar", &[])).unwrap_err();
        assert_eq!(fault.code, 709);

        let fault = dispatcher.dispatch(&rc("FooBar", &[])).unwrap_err();
        assert_eq!(fault.code, 709);

        let fault = dispatcher
            .dispatch(&request(SERVICE_ID_CONNECTIONMANAGER, "FooBar", &[]))
            .unwrap_err();
        assert_eq!(fault.code, 709);
    }

    #[test]
    fn test_happy_play_scenario() {
        let (dispatcher, player) = dispatcher();

        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[
                    ("CurrentURI", "http://host/song.mp3"),
                    ("CurrentURIMetaData", ""),
                ],
            ))
            .unwrap();

        let response = dispatcher
            .dispatch(&avt("Play", &[("Speed", "1")]))
            .unwrap();
        assert_eq!(out(&response, "Speed"), "1");
        assert_eq!(player.inner.lock().uri, "http://host/song.mp3");

        let info = dispatcher.dispatch(&avt("GetTransportInfo", &[])).unwrap();
        assert_eq!(out(&info, "CurrentTransportState"), "PLAYING");
        assert_eq!(out(&info, "CurrentTransportStatus"), "OK");
        assert_eq!(out(&info, "CurrentSpeed"), "1");
    }

    #[test]
    fn test_pause_resume_scenario() {
        let (dispatcher, _) = dispatcher();
        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[("CurrentURI", "http://host/a.mp3"), ("CurrentURIMetaData", "")],
            ))
            .unwrap();
        dispatcher.dispatch(&avt("Play", &[("Speed", "1")])).unwrap();

        dispatcher.dispatch(&avt("Pause", &[])).unwrap();
        let info = dispatcher.dispatch(&avt("GetTransportInfo", &[])).unwrap();
        assert_eq!(out(&info, "CurrentTransportState"), "PAUSED_PLAYBACK");

        // Play depuis PAUSED reprend sans reconfigurer
        dispatcher.dispatch(&avt("Play", &[("Speed", "1")])).unwrap();
        let info = dispatcher.dispatch(&avt("GetTransportInfo", &[])).unwrap();
        assert_eq!(out(&info, "CurrentTransportState"), "PLAYING");
    }

    #[test]
    fn test_play_without_uri_is_702() {
        let (dispatcher, _) = dispatcher();
        let fault = dispatcher
            .dispatch(&avt("Play", &[("Speed", "1")]))
            .unwrap_err();
        assert_eq!(fault.code, 702);
    }

    #[test]
    fn test_set_uri_empty_is_701() {
        let (dispatcher, _) = dispatcher();
        let fault = dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[("CurrentURI", ""), ("CurrentURIMetaData", "")],
            ))
            .unwrap_err();
        assert_eq!(fault.code, 701);

        let fault = dispatcher
            .dispatch(&avt("SetAVTransportURI", &[]))
            .unwrap_err();
        assert_eq!(fault.code, 701);
    }

    #[test]
    fn test_set_uri_resets_state_without_starting_playback() {
        let (dispatcher, player) = dispatcher();
        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[("CurrentURI", "http://host/a.mp3"), ("CurrentURIMetaData", "")],
            ))
            .unwrap();

        assert!(!player.inner.lock().playing);
        let state = dispatcher.state_snapshot();
        assert_eq!(state.transport_state, TransportState::Stopped);
        assert_eq!(state.current_uri, "http://host/a.mp3");
    }

    #[test]
    fn test_play_failure_is_703_and_state_not_advanced() {
        let (dispatcher, player) = dispatcher();
        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[("CurrentURI", "http://host/a.mp3"), ("CurrentURIMetaData", "")],
            ))
            .unwrap();

        player.inner.lock().fail_play = true;
        let fault = dispatcher
            .dispatch(&avt("Play", &[("Speed", "1")]))
            .unwrap_err();
        assert_eq!(fault.code, 703);
        assert_eq!(
            dispatcher.state_snapshot().transport_state,
            TransportState::Stopped
        );
    }

    #[test]
    fn test_pause_when_not_playing_is_704() {
        let (dispatcher, _) = dispatcher();
        let fault = dispatcher.dispatch(&avt("Pause", &[])).unwrap_err();
        assert_eq!(fault.code, 704);
    }

    #[test]
    fn test_stop_from_any_state_succeeds() {
        let (dispatcher, _) = dispatcher();
        let response = dispatcher.dispatch(&avt("Stop", &[])).unwrap();
        assert!(response.out_args.is_empty());

        let info = dispatcher.dispatch(&avt("GetTransportInfo", &[])).unwrap();
        assert_eq!(out(&info, "CurrentTransportState"), "STOPPED");
    }

    #[test]
    fn test_seek_contract() {
        let (dispatcher, player) = dispatcher();
        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[("CurrentURI", "http://host/a.mp3"), ("CurrentURIMetaData", "")],
            ))
            .unwrap();
        dispatcher.dispatch(&avt("Play", &[("Speed", "1")])).unwrap();

        // Unité non supportée
        let fault = dispatcher
            .dispatch(&avt("Seek", &[("Unit", "ABS_COUNT"), ("Target", "0")]))
            .unwrap_err();
        assert_eq!(fault.code, 705);

        // Cible manquante
        let fault = dispatcher
            .dispatch(&avt("Seek", &[("Unit", "REL_TIME")]))
            .unwrap_err();
        assert_eq!(fault.code, 706);

        // Format invalide
        let fault = dispatcher
            .dispatch(&avt("Seek", &[("Unit", "REL_TIME"), ("Target", "bogus")]))
            .unwrap_err();
        assert_eq!(fault.code, 707);

        // Seek OK
        dispatcher
            .dispatch(&avt("Seek", &[("Unit", "REL_TIME"), ("Target", "00:00:30")]))
            .unwrap();
        assert_eq!(player.inner.lock().seek_target, Some(30));

        // Échec du player
        player.inner.lock().fail_seek = true;
        let fault = dispatcher
            .dispatch(&avt("Seek", &[("Unit", "REL_TIME"), ("Target", "00:00:10")]))
            .unwrap_err();
        assert_eq!(fault.code, 708);
    }

    #[test]
    fn test_position_info_after_seek() {
        let (dispatcher, player) = dispatcher();
        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[("CurrentURI", "http://host/a.mp3"), ("CurrentURIMetaData", "")],
            ))
            .unwrap();
        dispatcher.dispatch(&avt("Play", &[("Speed", "1")])).unwrap();
        player.inner.lock().position = (0, 180);

        dispatcher
            .dispatch(&avt("Seek", &[("Unit", "REL_TIME"), ("Target", "00:00:30")]))
            .unwrap();

        let info = dispatcher.dispatch(&avt("GetPositionInfo", &[])).unwrap();
        assert_eq!(out(&info, "RelTime"), "00:00:30");
        assert_eq!(out(&info, "AbsTime"), "00:00:30");
        assert_eq!(out(&info, "TrackDuration"), "00:03:00");
        assert_eq!(out(&info, "Track"), "0");
        assert_eq!(out(&info, "RelCount"), "2147483647");
    }

    #[test]
    fn test_position_info_uri_is_escaped_by_builder_input() {
        let (dispatcher, _) = dispatcher();
        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[
                    ("CurrentURI", "http://host/a&b.mp3"),
                    ("CurrentURIMetaData", ""),
                ],
            ))
            .unwrap();

        let info = dispatcher.dispatch(&avt("GetPositionInfo", &[])).unwrap();
        // La valeur brute vit dans la réponse typée ; l'échappement XML est
        // appliqué par le sérialiseur SOAP.
        assert_eq!(out(&info, "TrackURI"), "http://host/a&b.mp3");
    }

    #[test]
    fn test_position_info_unknown_times_render_zero() {
        let (dispatcher, player) = dispatcher();
        player.inner.lock().position = (-1, -1);

        let info = dispatcher.dispatch(&avt("GetPositionInfo", &[])).unwrap();
        assert_eq!(out(&info, "RelTime"), "00:00:00");
        assert_eq!(out(&info, "TrackDuration"), "00:00:00");
    }

    #[test]
    fn test_media_info_fields() {
        let (dispatcher, player) = dispatcher();
        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[
                    ("CurrentURI", "http://host/a.mp3"),
                    ("CurrentURIMetaData", "<DIDL-Lite/>"),
                ],
            ))
            .unwrap();
        player.inner.lock().position = (10, 240);

        let info = dispatcher.dispatch(&avt("GetMediaInfo", &[])).unwrap();
        assert_eq!(out(&info, "NrTracks"), "1");
        assert_eq!(out(&info, "MediaDuration"), "00:04:00");
        assert_eq!(out(&info, "CurrentURI"), "http://host/a.mp3");
        assert_eq!(out(&info, "CurrentURIMetaData"), "<DIDL-Lite/>");
        assert_eq!(out(&info, "NextURI"), "");
        assert_eq!(out(&info, "PlayMedium"), "NETWORK");
        assert_eq!(out(&info, "RecordMedium"), "NOT_IMPLEMENTED");
        assert_eq!(out(&info, "WriteStatus"), "NOT_IMPLEMENTED");
    }

    #[test]
    fn test_transport_info_tracks_backend_flags() {
        // L'EOS met le backend à l'arrêt sans passer par une action :
        // GetTransportInfo doit suivre le backend, pas l'état mémorisé.
        let (dispatcher, player) = dispatcher();
        dispatcher
            .dispatch(&avt(
                "SetAVTransportURI",
                &[("CurrentURI", "http://host/a.mp3"), ("CurrentURIMetaData", "")],
            ))
            .unwrap();
        dispatcher.dispatch(&avt("Play", &[("Speed", "1")])).unwrap();

        player.inner.lock().playing = false; // fin de flux

        let info = dispatcher.dispatch(&avt("GetTransportInfo", &[])).unwrap();
        assert_eq!(out(&info, "CurrentTransportState"), "STOPPED");
    }

    #[test]
    fn test_volume_roundtrip_all_values() {
        let (dispatcher, _) = dispatcher();

        for volume in [0u32, 1, 37, 50, 99, 100] {
            let value = volume.to_string();
            dispatcher
                .dispatch(&rc(
                    "SetVolume",
                    &[("Channel", "Master"), ("DesiredVolume", &value)],
                ))
                .unwrap();

            let response = dispatcher
                .dispatch(&rc("GetVolume", &[("Channel", "Master")]))
                .unwrap();
            assert_eq!(out(&response, "CurrentVolume"), value);
        }
    }

    #[test]
    fn test_volume_zero_implies_mute() {
        let (dispatcher, _) = dispatcher();

        dispatcher
            .dispatch(&rc(
                "SetVolume",
                &[("Channel", "Master"), ("DesiredVolume", "0")],
            ))
            .unwrap();
        let mute = dispatcher
            .dispatch(&rc("GetMute", &[("Channel", "Master")]))
            .unwrap();
        assert_eq!(out(&mute, "CurrentMute"), "1");

        dispatcher
            .dispatch(&rc(
                "SetVolume",
                &[("Channel", "Master"), ("DesiredVolume", "25")],
            ))
            .unwrap();
        let mute = dispatcher
            .dispatch(&rc("GetMute", &[("Channel", "Master")]))
            .unwrap();
        assert_eq!(out(&mute, "CurrentMute"), "0");
    }

    #[test]
    fn test_volume_faults() {
        let (dispatcher, player) = dispatcher();

        // Valeur manquante
        let fault = dispatcher
            .dispatch(&rc("SetVolume", &[("Channel", "Master")]))
            .unwrap_err();
        assert_eq!(fault.code, 711);

        // Hors bornes : état inchangé
        let before = dispatcher.state_snapshot().volume_percent;
        let fault = dispatcher
            .dispatch(&rc(
                "SetVolume",
                &[("Channel", "Master"), ("DesiredVolume", "150")],
            ))
            .unwrap_err();
        assert_eq!(fault.code, 712);
        assert_eq!(dispatcher.state_snapshot().volume_percent, before);

        let fault = dispatcher
            .dispatch(&rc(
                "SetVolume",
                &[("Channel", "Master"), ("DesiredVolume", "-3")],
            ))
            .unwrap_err();
        assert_eq!(fault.code, 712);

        // Canal non supporté
        let fault = dispatcher
            .dispatch(&rc(
                "SetVolume",
                &[("Channel", "LF"), ("DesiredVolume", "10")],
            ))
            .unwrap_err();
        assert_eq!(fault.code, 713);

        let fault = dispatcher
            .dispatch(&rc("GetVolume", &[("Channel", "LF")]))
            .unwrap_err();
        assert_eq!(fault.code, 710);

        // Échec du player
        player.inner.lock().fail_volume = true;
        let fault = dispatcher
            .dispatch(&rc(
                "SetVolume",
                &[("Channel", "Master"), ("DesiredVolume", "10")],
            ))
            .unwrap_err();
        assert_eq!(fault.code, 714);
    }

    #[test]
    fn test_get_volume_defaults_to_master_channel() {
        let (dispatcher, player) = dispatcher();
        player.inner.lock().volume = 50;
        let response = dispatcher.dispatch(&rc("GetVolume", &[])).unwrap();
        assert_eq!(out(&response, "CurrentVolume"), "50");
    }

    #[test]
    fn test_set_mute_contract() {
        let (dispatcher, player) = dispatcher();

        let fault = dispatcher.dispatch(&rc("SetMute", &[])).unwrap_err();
        assert_eq!(fault.code, 715);

        dispatcher
            .dispatch(&rc(
                "SetMute",
                &[("Channel", "Master"), ("DesiredMute", "1")],
            ))
            .unwrap();
        assert!(player.inner.lock().muted);

        dispatcher
            .dispatch(&rc(
                "SetMute",
                &[("Channel", "Master"), ("DesiredMute", "0")],
            ))
            .unwrap();
        assert!(!player.inner.lock().muted);
    }

    #[test]
    fn test_connection_manager_actions() {
        let (dispatcher, _) = dispatcher();

        let response = dispatcher
            .dispatch(&request(SERVICE_ID_CONNECTIONMANAGER, "GetProtocolInfo", &[]))
            .unwrap();
        assert_eq!(out(&response, "Source"), "");
        assert!(out(&response, "Sink").contains("http-get:*:audio/mpeg:*"));

        let response = dispatcher
            .dispatch(&request(
                SERVICE_ID_CONNECTIONMANAGER,
                "GetCurrentConnectionIDs",
                &[],
            ))
            .unwrap();
        assert_eq!(out(&response, "ConnectionIDs"), "0");
    }

    #[test]
    fn test_response_carries_service_type() {
        let (dispatcher, _) = dispatcher();
        let response = dispatcher.dispatch(&avt("GetTransportInfo", &[])).unwrap();
        assert_eq!(response.service_type, SERVICE_TYPE_AVTRANSPORT);
    }
}
