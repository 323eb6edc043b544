//! Cœur de traitement audio du service Audioscribe.
//!
//! Le crate couvre trois responsabilités: le découpage d'un fichier audio en
//! chunks (`split`), leur stockage par identifiant opaque (`storage`) et leur
//! transcription via l'API hébergée (`transcription`). Le reste du service
//! (HTTP, sessions, persistance) vit chez l'appelant, qui enchaîne
//! typiquement `AudioSplitter::split` puis `TranscriptionClient::transcribe_all`
//! sur les identifiants retournés.

pub mod binaries;
pub mod split;
pub mod storage;
pub mod transcription;
pub mod utils;

pub use split::{AudioSplitter, SplitError, SplitOptions, SplitPlan};
pub use storage::{ChunkId, ChunkStore, FsChunkStore, MemoryChunkStore, StoreError, UploadStream};
pub use transcription::{TranscribeError, TranscriptionClient};
