//! Options de configuration du backend de lecture.

/// Configuration du pipeline et du mixer, consommée une fois à l'init.
#[derive(Debug, Clone)]
pub struct PlayerOptions {
    /// Carte ALSA (ex: "hw:0")
    pub card: String,

    /// Nom de l'élément simple du mixer ALSA (ex: "DAC volume")
    pub selem_name: String,

    /// Taille du buffer du sink, en microsecondes
    pub buffer_time_us: i64,

    /// Latence du sink, en microsecondes
    pub latency_time_us: i64,

    /// Volume initial 0..100 ; 0 = lire le volume matériel au démarrage
    pub initial_volume: u32,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            card: "hw:0".to_string(),
            selem_name: "DAC volume".to_string(),
            buffer_time_us: 200_000,
            latency_time_us: 10_000,
            initial_volume: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let options = PlayerOptions::default();
        assert_eq!(options.card, "hw:0");
        assert_eq!(options.selem_name, "DAC volume");
        assert_eq!(options.buffer_time_us, 200_000);
        assert_eq!(options.latency_time_us, 10_000);
        assert_eq!(options.initial_volume, 0);
    }
}
