use std::io::Read;
use std::time::Duration;

use reqwest::multipart::{Form, Part};

use crate::storage::{ChunkId, ChunkStore};

use super::error::TranscribeError;
use super::types::{TranscriptionResponse, DEFAULT_API_BASE_URL, TRANSCRIPTION_MODEL};

/// Nombre maximal de tentatives par chunk pour les échecs transitoires.
const MAX_RETRIES: usize = 3;

/// Client de l'API de transcription hébergée.
pub struct TranscriptionClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TranscriptionClient {
    /// Construit un client pour l'endpoint par défaut.
    pub fn new(api_key: impl Into<String>) -> Result<Self, TranscribeError> {
        Self::with_base_url(api_key, DEFAULT_API_BASE_URL)
    }

    /// Construit un client pour un endpoint spécifique (proxy, tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, TranscribeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TranscribeError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(Duration::from_secs(15 * 60))
            .build()?;
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }

    /// Transcrit un chunk stocké et retourne la réponse structurée de l'API.
    ///
    /// Les erreurs de transport et les statuts 5xx/429 sont retentés jusqu'à
    /// trois fois; un 4xx rejouerait à l'identique et échoue immédiatement.
    pub async fn transcribe_chunk(
        &self,
        store: &dyn ChunkStore,
        id: &ChunkId,
    ) -> Result<TranscriptionResponse, TranscribeError> {
        let mut reader = store.open_download_stream(id)?;
        let mut audio_bytes = Vec::new();
        reader.read_to_end(&mut audio_bytes)?;
        log::debug!(
            "[transcribe] chunk {} downloaded from store ({} bytes)",
            id,
            audio_bytes.len()
        );

        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let mut last_error = String::new();

        for attempt in 1..=MAX_RETRIES {
            let part = Part::bytes(audio_bytes.clone())
                .file_name(format!("{}.mp3", id))
                .mime_str("audio/mpeg")?;
            let form = Form::new()
                .part("file", part)
                .text("model", TRANSCRIPTION_MODEL)
                .text("timestamp_granularities[]", "segment");

            let response = match self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .multipart(form)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    log::warn!(
                        "[transcribe] request failed (attempt {}/{}): {}",
                        attempt,
                        MAX_RETRIES,
                        e
                    );
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<TranscriptionResponse>().await?);
            }

            let detail = response.text().await.unwrap_or_default();
            if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                log::warn!(
                    "[transcribe] HTTP {} (attempt {}/{}): {}",
                    status,
                    attempt,
                    MAX_RETRIES,
                    detail
                );
                last_error = format!("HTTP {}: {}", status, detail);
                continue;
            }
            return Err(TranscribeError::Api { status, detail });
        }

        Err(TranscribeError::RetriesExhausted {
            attempts: MAX_RETRIES,
            detail: last_error,
        })
    }

    /// Transcrit une séquence ordonnée de chunks et concatène les textes.
    ///
    /// Les identifiants sont consommés strictement dans l'ordre reçu, qui est
    /// l'ordre chronologique produit par le découpage.
    pub async fn transcribe_all(
        &self,
        store: &dyn ChunkStore,
        ids: &[ChunkId],
    ) -> Result<String, TranscribeError> {
        let mut full_transcript = String::new();
        for id in ids {
            let response = self.transcribe_chunk(store, id).await?;
            let text = response.transcript_text();
            log::info!("[transcribe] chunk {} transcribed ({} chars)", id, text.len());
            if !text.is_empty() {
                if !full_transcript.is_empty() {
                    full_transcript.push(' ');
                }
                full_transcript.push_str(&text);
            }
        }
        Ok(full_transcript.trim().to_string())
    }
}
