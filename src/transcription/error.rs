use crate::storage::StoreError;

/// Erreurs du client de transcription.
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    /// Clé d'API absente ou vide.
    #[error("transcription API key is missing")]
    MissingApiKey,

    /// Lecture du chunk dans le store impossible.
    #[error("chunk store error: {0}")]
    Store(#[from] StoreError),

    /// Erreur d'entrée/sortie locale.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur de transport ou de décodage HTTP.
    #[error("transcription request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Réponse d'erreur explicite de l'API.
    #[error("transcription API returned HTTP {status}: {detail}")]
    Api {
        /// Statut HTTP retourné.
        status: reqwest::StatusCode,
        /// Corps d'erreur retourné par l'API.
        detail: String,
    },

    /// Échec définitif après tentatives bornées.
    #[error("transcription failed after {attempts} attempts: {detail}")]
    RetriesExhausted {
        /// Nombre de tentatives effectuées.
        attempts: usize,
        /// Dernière erreur observée.
        detail: String,
    },
}
