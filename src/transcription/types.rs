/// URL racine par défaut de l'API de transcription.
pub const DEFAULT_API_BASE_URL: &str = "https://api.mistral.ai";

/// Modèle de transcription utilisé pour chaque chunk.
pub const TRANSCRIPTION_MODEL: &str = "voxtral-mini-latest";

/// Segment horodaté d'une transcription.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TranscriptSegment {
    /// Texte transcrit du segment.
    pub text: String,
    /// Début du segment en secondes, relatif au chunk.
    #[serde(default)]
    pub start: f64,
    /// Fin du segment en secondes, relative au chunk.
    #[serde(default)]
    pub end: f64,
}

/// Réponse de l'endpoint de transcription pour un chunk.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct TranscriptionResponse {
    /// Texte complet du chunk.
    #[serde(default)]
    pub text: String,
    /// Segments horodatés, dans l'ordre du chunk.
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
    /// Langue détectée, si l'API la fournit.
    #[serde(default)]
    pub language: Option<String>,
}

impl TranscriptionResponse {
    /// Texte du chunk: le champ `text`, sinon la concaténation des segments.
    pub fn transcript_text(&self) -> String {
        let text = self.text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
        self.segments
            .iter()
            .map(|segment| segment.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
