//! Pont avec le mixer matériel ALSA.
//!
//! Fait la passerelle entre le volume logiciel (0..100) et la plage de
//! l'élément simple du mixer (`selem`). Chaque opération ouvre, attache et
//! referme son propre handle : le mixer n'est utilisé qu'au démarrage
//! (lecture) et à l'arrêt (écriture conditionnelle), jamais en même temps
//! que le dispatch d'actions.

use alsa::mixer::{Mixer, Selem, SelemChannelId, SelemId};
use thiserror::Error;
use tracing::{debug, error};

/// Erreurs du mixer matériel.
///
/// Elles sont loggées et n'interrompent jamais l'appelant : un mixer
/// absent dégrade seulement la synchronisation du volume.
#[derive(Debug, Error)]
pub enum MixerError {
    #[error("ALSA mixer error on {card}: {source}")]
    Alsa {
        card: String,
        #[source]
        source: alsa::Error,
    },

    #[error("mixer element '{0}' not found")]
    ElementNotFound(String),
}

/// Volume matériel avec sa plage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwVolume {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl HwVolume {
    /// Convertit le volume matériel en pourcentage logiciel 0..100.
    pub fn as_percent(&self) -> u32 {
        if self.max <= self.min {
            return 0;
        }
        (((self.value - self.min) as f64 / (self.max - self.min) as f64) * 100.0).round() as u32
    }
}

/// Valeur matérielle correspondant à `percent ∈ [0.0, 1.0]` sur `[min, max]`.
pub fn hw_value_for(min: i64, max: i64, percent: f64) -> i64 {
    let percent = percent.clamp(0.0, 1.0);
    min + (percent * (max - min) as f64) as i64
}

/// Accès au mixer d'une carte ALSA.
#[derive(Debug, Clone)]
pub struct HardwareMixer {
    card: String,
    selem_name: String,
}

impl HardwareMixer {
    pub fn new(card: impl Into<String>, selem_name: impl Into<String>) -> Self {
        Self {
            card: card.into(),
            selem_name: selem_name.into(),
        }
    }

    fn open(&self) -> Result<Mixer, MixerError> {
        Mixer::new(&self.card, false).map_err(|source| MixerError::Alsa {
            card: self.card.clone(),
            source,
        })
    }

    fn with_selem<T>(
        &self,
        f: impl FnOnce(&Selem) -> Result<T, alsa::Error>,
    ) -> Result<T, MixerError> {
        let mixer = self.open()?;
        let sid = SelemId::new(&self.selem_name, 0);
        let selem = mixer
            .find_selem(&sid)
            .ok_or_else(|| MixerError::ElementNotFound(self.selem_name.clone()))?;

        f(&selem).map_err(|source| MixerError::Alsa {
            card: self.card.clone(),
            source,
        })
    }

    /// Liste les éléments simples du mixer (diagnostic).
    pub fn list_controls(&self) {
        match self.open() {
            Ok(mixer) => {
                for elem in mixer.iter() {
                    if let Some(selem) = Selem::new(elem) {
                        if let Ok(name) = selem.get_id().get_name() {
                            debug!("Found mixer control: '{}'", name);
                        }
                    }
                }
            }
            Err(e) => error!("Failed to list mixer controls: {}", e),
        }
    }

    /// Lit le volume de lecture (canal FRONT_LEFT) et sa plage.
    pub fn get_volume(&self) -> Result<HwVolume, MixerError> {
        self.with_selem(|selem| {
            let (min, max) = selem.get_playback_volume_range();
            let value = selem.get_playback_volume(SelemChannelId::FrontLeft)?;
            Ok(HwVolume { value, min, max })
        })
    }

    /// Écrit `percent ∈ [0.0, 1.0]` sur tous les canaux de l'élément.
    pub fn set_volume_all(&self, percent: f64) -> Result<(), MixerError> {
        self.with_selem(|selem| {
            let (min, max) = selem.get_playback_volume_range();
            let hw_vol = hw_value_for(min, max, percent);
            debug!("Writing hardware volume {} (range {} ~ {})", hw_vol, min, max);
            selem.set_playback_volume_all(hw_vol)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hw_value_mapping_endpoints() {
        assert_eq!(hw_value_for(0, 255, 0.0), 0);
        assert_eq!(hw_value_for(0, 255, 1.0), 255);
        assert_eq!(hw_value_for(-64, 0, 1.0), 0);
        assert_eq!(hw_value_for(-64, 0, 0.0), -64);
    }

    #[test]
    fn test_hw_value_mapping_midpoint_and_clamping() {
        assert_eq!(hw_value_for(0, 100, 0.5), 50);
        assert_eq!(hw_value_for(0, 100, 1.5), 100);
        assert_eq!(hw_value_for(0, 100, -0.5), 0);
    }

    #[test]
    fn test_hw_volume_as_percent() {
        let v = HwVolume {
            value: 128,
            min: 0,
            max: 255,
        };
        assert_eq!(v.as_percent(), 50);

        let top = HwVolume {
            value: 255,
            min: 0,
            max: 255,
        };
        assert_eq!(top.as_percent(), 100);

        // Plage dégénérée
        let flat = HwVolume {
            value: 3,
            min: 3,
            max: 3,
        };
        assert_eq!(flat.as_percent(), 0);
    }

    #[test]
    fn test_unknown_card_reports_mixer_error() {
        let mixer = HardwareMixer::new("hw:no-such-card-99", "DAC volume");
        assert!(mixer.get_volume().is_err());
        assert!(mixer.set_volume_all(0.5).is_err());
    }
}
