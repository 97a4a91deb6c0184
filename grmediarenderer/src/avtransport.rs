//! Actions du service AVTransport:1.
//!
//! Toutes les fonctions s'exécutent sous le mutex du renderer, détenu par
//! le dispatcher.

use crate::dispatcher::{ActionFault, ActionRequest, EventSink};
use crate::state::{RendererState, TransportState, format_hms, parse_hms};
use grplayer::PlayerBackend;
use tracing::{debug, error};

/// Nom du service pour les notifications GENA.
const SERVICE: &str = "AVTransport";

type OutArgs = Vec<(String, String)>;

/// Route une action AVTransport.
pub(crate) fn handle(
    state: &mut RendererState,
    player: &dyn PlayerBackend,
    events: &EventSink,
    request: &ActionRequest,
) -> Result<OutArgs, ActionFault> {
    match request.action_name.as_str() {
        "SetAVTransportURI" => set_av_transport_uri(state, events, request),
        "Play" => play(state, player, events),
        "Stop" => stop(state, player, events),
        "Pause" => pause(state, player, events),
        "Seek" => seek(player, request),
        "GetPositionInfo" => Ok(get_position_info(state, player)),
        "GetTransportInfo" => Ok(get_transport_info(player)),
        "GetMediaInfo" => Ok(get_media_info(state, player)),
        other => {
            error!("Unhandled AVTransport action: {}", other);
            Err(ActionFault::new(709, "Unsupported action"))
        }
    }
}

/// Mémorise l'URI sans démarrer la lecture ; l'état repasse à STOPPED.
fn set_av_transport_uri(
    state: &mut RendererState,
    events: &EventSink,
    request: &ActionRequest,
) -> Result<OutArgs, ActionFault> {
    let uri = match request.arg("CurrentURI") {
        Some(uri) if !uri.is_empty() => uri,
        _ => return Err(ActionFault::new(701, "Invalid URI")),
    };

    state.current_uri = uri.to_string();
    state.current_uri_metadata = request.arg("CurrentURIMetaData").unwrap_or("").to_string();
    state.transport_state = TransportState::Stopped;

    debug!("Set URI: {}", state.current_uri);
    events.push(SERVICE, "AVTransportURI", state.current_uri.clone());
    events.push(SERVICE, "TransportState", state.transport_state.as_str());

    Ok(Vec::new())
}

/// Démarre (ou reprend) la lecture de l'URI courante.
///
/// `Speed` est accepté mais ignoré : le renderer joue toujours à 1.
fn play(
    state: &mut RendererState,
    player: &dyn PlayerBackend,
    events: &EventSink,
) -> Result<OutArgs, ActionFault> {
    if state.current_uri.is_empty() {
        return Err(ActionFault::new(702, "URI not set"));
    }

    let result = if state.transport_state == TransportState::PausedPlayback {
        player.resume()
    } else {
        player.play(&state.current_uri)
    };

    if let Err(e) = result {
        error!("Playback failed: {}", e);
        return Err(ActionFault::new(703, "Playback failed"));
    }

    state.transport_state = TransportState::Playing;
    events.push(SERVICE, "TransportState", state.transport_state.as_str());

    Ok(vec![("Speed".to_string(), "1".to_string())])
}

/// Arrête la session en cours ; toujours un succès.
fn stop(
    state: &mut RendererState,
    player: &dyn PlayerBackend,
    events: &EventSink,
) -> Result<OutArgs, ActionFault> {
    if let Err(e) = player.stop() {
        error!("Stop failed (not playing?): {}", e);
    }
    state.transport_state = TransportState::Stopped;
    events.push(SERVICE, "TransportState", state.transport_state.as_str());

    Ok(Vec::new())
}

fn pause(
    state: &mut RendererState,
    player: &dyn PlayerBackend,
    events: &EventSink,
) -> Result<OutArgs, ActionFault> {
    if !player.is_playing() {
        return Err(ActionFault::new(704, "Not playing"));
    }

    match player.pause() {
        Ok(()) => {
            state.transport_state = TransportState::PausedPlayback;
            events.push(SERVICE, "TransportState", state.transport_state.as_str());
        }
        Err(e) => error!("Pause failed: {}", e),
    }

    Ok(Vec::new())
}

fn seek(player: &dyn PlayerBackend, request: &ActionRequest) -> Result<OutArgs, ActionFault> {
    match request.arg("Unit") {
        Some("REL_TIME") => {}
        _ => return Err(ActionFault::new(705, "Unsupported seek unit")),
    }

    let target = request
        .arg("Target")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ActionFault::new(706, "Missing target"))?;

    let seconds =
        parse_hms(target).ok_or_else(|| ActionFault::new(707, "Invalid time format"))?;

    player
        .seek(seconds)
        .map_err(|_| ActionFault::new(708, "Seek failed"))?;

    debug!("Seek to {} ({} seconds)", target, seconds);
    Ok(Vec::new())
}

fn get_position_info(state: &RendererState, player: &dyn PlayerBackend) -> OutArgs {
    let (current, total) = player.position();
    let rel_time = format_hms(current);

    vec![
        ("Track".to_string(), "0".to_string()),
        ("TrackDuration".to_string(), format_hms(total)),
        ("TrackMetaData".to_string(), String::new()),
        ("TrackURI".to_string(), state.current_uri.clone()),
        ("RelTime".to_string(), rel_time.clone()),
        ("AbsTime".to_string(), rel_time),
        ("RelCount".to_string(), "2147483647".to_string()),
        ("AbsCount".to_string(), "2147483647".to_string()),
    ]
}

/// L'état rapporté suit les drapeaux du backend : une fin de flux (EOS)
/// passe le backend à l'arrêt sans action SOAP, le control point doit le
/// voir au prochain GetTransportInfo.
fn get_transport_info(player: &dyn PlayerBackend) -> OutArgs {
    let transport_state = if player.is_playing() {
        TransportState::Playing
    } else if player.is_paused() {
        TransportState::PausedPlayback
    } else {
        TransportState::Stopped
    };

    vec![
        (
            "CurrentTransportState".to_string(),
            transport_state.as_str().to_string(),
        ),
        ("CurrentTransportStatus".to_string(), "OK".to_string()),
        ("CurrentSpeed".to_string(), "1".to_string()),
    ]
}

fn get_media_info(state: &RendererState, player: &dyn PlayerBackend) -> OutArgs {
    let (_, total) = player.position();

    vec![
        ("NrTracks".to_string(), "1".to_string()),
        ("MediaDuration".to_string(), format_hms(total)),
        ("CurrentURI".to_string(), state.current_uri.clone()),
        (
            "CurrentURIMetaData".to_string(),
            state.current_uri_metadata.clone(),
        ),
        ("NextURI".to_string(), state.next_uri.clone()),
        (
            "NextURIMetaData".to_string(),
            state.next_uri_metadata.clone(),
        ),
        ("PlayMedium".to_string(), "NETWORK".to_string()),
        ("RecordMedium".to_string(), "NOT_IMPLEMENTED".to_string()),
        ("WriteStatus".to_string(), "NOT_IMPLEMENTED".to_string()),
    ]
}
