//! Découpage d'un fichier audio en chunks stockés.
//!
//! Le pipeline applique une politique fixe: une source de 900 secondes ou
//! moins est uploadée telle quelle; au-delà, elle est extraite en segments
//! de 840 secondes par copie de flux ffmpeg, uploadés un par un dans l'ordre
//! chronologique.

mod error;
mod pipeline;
mod probe;
mod types;

pub use error::SplitError;
pub use pipeline::AudioSplitter;
pub use probe::probe_duration;
pub use types::{SegmentSpan, SplitOptions, SplitPlan, SEGMENT_LENGTH_SECS, SPLIT_THRESHOLD_SECS};
