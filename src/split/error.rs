use crate::binaries::ToolResolveError;
use crate::storage::StoreError;

/// Erreurs du pipeline de découpage audio.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// L'outil audio externe est introuvable ou inutilisable.
    #[error("audio tool unavailable: {0}")]
    ToolUnavailable(#[source] ToolResolveError),

    /// La durée de la source n'a pas pu être déterminée.
    #[error("unable to probe audio duration: {detail}")]
    Probe {
        /// Diagnostic de la sonde.
        detail: String,
    },

    /// Une extraction ffmpeg a échoué pour un segment donné.
    #[error("segment {index}: extraction failed: {detail}")]
    ToolExecution {
        /// Index chronologique du segment en échec.
        index: usize,
        /// Code de sortie ffmpeg, absent si le process n'a pas démarré.
        code: Option<i32>,
        /// Sortie d'erreur de l'outil.
        detail: String,
    },

    /// L'upload d'un chunk vers le store a échoué.
    #[error("segment {index}: upload failed: {source}")]
    Storage {
        /// Index chronologique du segment en échec.
        index: usize,
        /// Erreur du store sous-jacent.
        #[source]
        source: StoreError,
    },
}
