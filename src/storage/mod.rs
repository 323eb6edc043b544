//! Stockage des chunks audio par identifiant opaque.
//!
//! Le pipeline de découpage et la transcription ne connaissent du stockage
//! que cette interface: un flux d'upload qui attribue un identifiant à la
//! finalisation, et un flux de lecture par identifiant. Les copies sont
//! bloquantes des deux côtés.

use std::fmt;
use std::io::{Read, Write};

mod fs;
mod memory;

pub use fs::FsChunkStore;
pub use memory::MemoryChunkStore;

/// Identifiant opaque attribué par le store à un chunk audio.
///
/// Aucune sémantique au-delà de l'égalité et de l'ordre d'émission: le
/// pipeline le retourne tel quel et la transcription le consomme tel quel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChunkId(String);

impl ChunkId {
    /// Construit un identifiant depuis sa représentation brute.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Retourne la représentation brute de l'identifiant.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Erreur d'accès au store de chunks.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Erreur d'entrée/sortie sous-jacente.
    #[error("chunk store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Chunk inconnu du store.
    #[error("chunk not found: {0}")]
    NotFound(ChunkId),
    /// Échec propre à l'implémentation du store.
    #[error("chunk store backend error: {0}")]
    Backend(String),
}

/// Flux d'upload d'un chunk; l'identifiant n'est connu qu'à la finalisation.
pub trait UploadStream: Write + Send {
    /// Finalise l'upload et retourne l'identifiant attribué par le store.
    fn finish(self: Box<Self>) -> Result<ChunkId, StoreError>;
}

/// Store de chunks adressés par identifiant opaque.
pub trait ChunkStore: Send + Sync {
    /// Ouvre un flux d'upload pour un chunk nommé `name`.
    fn open_upload_stream(&self, name: &str) -> Result<Box<dyn UploadStream>, StoreError>;

    /// Ouvre un flux de lecture du chunk `id`.
    fn open_download_stream(&self, id: &ChunkId) -> Result<Box<dyn Read + Send>, StoreError>;
}
