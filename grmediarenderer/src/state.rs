//! État logique du renderer et helpers de formatage temporel.

/// État de transport AVTransport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    PausedPlayback,
    Transitioning,
}

impl TransportState {
    /// Représentation UPnP de l'état.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportState::Stopped => "STOPPED",
            TransportState::Playing => "PLAYING",
            TransportState::PausedPlayback => "PAUSED_PLAYBACK",
            TransportState::Transitioning => "TRANSITIONING",
        }
    }
}

/// État logique du renderer, protégé par l'unique mutex du dispatcher.
///
/// Invariants :
/// - `transport_state != STOPPED` implique `current_uri` non vide
/// - `muted` reflète la propriété mute du pipeline ; volume 0 implique
///   mute actif, tout volume non nul le désactive
#[derive(Debug, Clone)]
pub struct RendererState {
    /// URI de la ressource courante, éventuellement vide
    pub current_uri: String,

    /// Métadonnées DIDL-Lite opaques associées
    pub current_uri_metadata: String,

    /// URI suivante (réservé, vide dans cette implémentation)
    pub next_uri: String,

    /// Métadonnées de l'URI suivante (réservé)
    pub next_uri_metadata: String,

    /// État de transport courant
    pub transport_state: TransportState,

    /// Vitesse de lecture, fixée à "1"
    pub speed: &'static str,

    /// Volume logiciel 0..100
    pub volume_percent: u32,

    /// État du mute
    pub muted: bool,
}

impl RendererState {
    /// Crée l'état initial (STOPPED, URI vide) avec le volume donné.
    pub fn new(initial_volume: u32) -> Self {
        Self {
            current_uri: String::new(),
            current_uri_metadata: String::new(),
            next_uri: String::new(),
            next_uri_metadata: String::new(),
            transport_state: TransportState::Stopped,
            speed: "1",
            volume_percent: initial_volume.min(100),
            muted: false,
        }
    }
}

/// Formate une durée en secondes au format `HH:MM:SS`.
///
/// Les valeurs inconnues (négatives) donnent `00:00:00`.
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Parse une cible de seek `hh:mm:ss` en secondes.
///
/// Retourne `None` si le format n'est pas trois champs entiers séparés
/// par `:`.
pub fn parse_hms(target: &str) -> Option<u64> {
    let mut parts = target.split(':');
    let hours: u64 = parts.next()?.trim().parse().ok()?;
    let minutes: u64 = parts.next()?.trim().parse().ok()?;
    let seconds: u64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(hours * 3600 + minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_state_strings() {
        assert_eq!(TransportState::Stopped.as_str(), "STOPPED");
        assert_eq!(TransportState::Playing.as_str(), "PLAYING");
        assert_eq!(TransportState::PausedPlayback.as_str(), "PAUSED_PLAYBACK");
        assert_eq!(TransportState::Transitioning.as_str(), "TRANSITIONING");
    }

    #[test]
    fn test_initial_state() {
        let state = RendererState::new(42);
        assert_eq!(state.transport_state, TransportState::Stopped);
        assert!(state.current_uri.is_empty());
        assert_eq!(state.speed, "1");
        assert_eq!(state.volume_percent, 42);
        assert!(!state.muted);

        // Le volume initial est borné à 100
        assert_eq!(RendererState::new(250).volume_percent, 100);
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(-1), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(3600), "01:00:00");
        assert_eq!(format_hms(3725), "01:02:05");
        assert_eq!(format_hms(360_000), "100:00:00");
    }

    #[test]
    fn test_parse_hms() {
        assert_eq!(parse_hms("00:00:30"), Some(30));
        assert_eq!(parse_hms("01:02:05"), Some(3725));
        assert_eq!(parse_hms("0:0:0"), Some(0));
        assert_eq!(parse_hms("10:00:00"), Some(36_000));
    }

    #[test]
    fn test_parse_hms_rejects_garbage() {
        assert_eq!(parse_hms(""), None);
        assert_eq!(parse_hms("30"), None);
        assert_eq!(parse_hms("00:30"), None);
        assert_eq!(parse_hms("aa:bb:cc"), None);
        assert_eq!(parse_hms("00:00:30:00"), None);
        assert_eq!(parse_hms("-1:00:00"), None);
    }

    #[test]
    fn test_format_parse_roundtrip() {
        for seconds in [0_i64, 1, 59, 60, 3599, 3600, 7325] {
            let formatted = format_hms(seconds);
            assert_eq!(parse_hms(&formatted), Some(seconds as u64));
        }
    }
}
