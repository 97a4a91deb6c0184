//! Erreurs du backend de lecture.

use thiserror::Error;

/// Erreurs remontées par le backend GStreamer.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Échec d'initialisation (GStreamer absent, élément introuvable).
    #[error("player initialisation failed: {0}")]
    Init(String),

    /// Le pipeline a refusé un changement d'état.
    #[error("pipeline state change failed: {0}")]
    StateChange(String),

    /// Opération invalide pour l'état courant du transport.
    #[error("cannot {action}: {reason}")]
    WrongState {
        action: &'static str,
        reason: &'static str,
    },

    /// Le seek a été refusé par le pipeline.
    #[error("seek to {seconds}s failed")]
    SeekFailed { seconds: u64 },
}
