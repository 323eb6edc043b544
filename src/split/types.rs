use std::path::PathBuf;
use std::time::Duration;

/// Durée (secondes) au-delà de laquelle un fichier audio doit être découpé.
pub const SPLIT_THRESHOLD_SECS: f64 = 15.0 * 60.0;

/// Durée (secondes) demandée pour chaque segment extrait.
///
/// Volontairement plus courte que le seuil de découpage: tout segment produit
/// reste sous la limite acceptée en aval, même quand le déclencheur est à
/// 900 secondes.
pub const SEGMENT_LENGTH_SECS: f64 = 14.0 * 60.0;

/// Fenêtre d'extraction demandée à ffmpeg pour un segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSpan {
    /// Index chronologique du segment.
    pub index: usize,
    /// Décalage de départ dans la source, en secondes.
    pub start_secs: f64,
    /// Durée demandée en secondes; ffmpeg tronque le dernier segment en fin de flux.
    pub length_secs: f64,
}

/// Plan de découpage, dérivé de la seule durée de la source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPlan {
    /// La source est uploadée telle quelle, sans invocation de ffmpeg.
    Whole,
    /// La source est extraite en `count` segments de `SEGMENT_LENGTH_SECS`.
    Segments {
        /// Nombre de segments à extraire.
        count: usize,
    },
}

impl SplitPlan {
    /// Dérive le plan de découpage d'une durée en secondes.
    pub fn for_duration(duration_secs: f64) -> Self {
        if duration_secs <= SPLIT_THRESHOLD_SECS {
            Self::Whole
        } else {
            let count = (duration_secs / SEGMENT_LENGTH_SECS).ceil() as usize;
            Self::Segments { count }
        }
    }

    /// Nombre de chunks produits par ce plan.
    pub fn chunk_count(&self) -> usize {
        match self {
            Self::Whole => 1,
            Self::Segments { count } => *count,
        }
    }

    /// Fenêtres d'extraction du plan, en ordre chronologique; vide pour un upload direct.
    pub fn spans(&self) -> Vec<SegmentSpan> {
        match self {
            Self::Whole => Vec::new(),
            Self::Segments { count } => (0..*count)
                .map(|index| SegmentSpan {
                    index,
                    start_secs: index as f64 * SEGMENT_LENGTH_SECS,
                    length_secs: SEGMENT_LENGTH_SECS,
                })
                .collect(),
        }
    }
}

/// Réglages du pipeline de découpage.
#[derive(Clone, Debug)]
pub struct SplitOptions {
    /// Chemin ffmpeg imposé; sinon résolution automatique.
    pub ffmpeg_path: Option<PathBuf>,
    /// Chemin ffprobe imposé; sinon résolution automatique.
    pub ffprobe_path: Option<PathBuf>,
    /// Durée maximale d'une invocation ffmpeg.
    pub tool_timeout: Duration,
    /// Dossier des fichiers temporaires; sinon le dossier temp système.
    pub temp_dir: Option<PathBuf>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            tool_timeout: Duration::from_secs(5 * 60),
            temp_dir: None,
        }
    }
}
