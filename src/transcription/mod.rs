//! Transcription des chunks stockés via l'API hébergée.
//!
//! Chaque chunk est relu depuis le store puis soumis tel quel à l'endpoint
//! de transcription; les textes sont concaténés dans l'ordre chronologique
//! des identifiants.

mod client;
mod error;
mod types;

pub use client::TranscriptionClient;
pub use error::TranscribeError;
pub use types::{
    TranscriptSegment, TranscriptionResponse, DEFAULT_API_BASE_URL, TRANSCRIPTION_MODEL,
};
