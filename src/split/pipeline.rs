use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use uuid::Uuid;

use crate::binaries;
use crate::storage::{ChunkId, ChunkStore, StoreError};
use crate::utils::path::normalize_existing_path;
use crate::utils::process::{configure_command_no_window, run_with_timeout, sanitize_cmd_error};
use crate::utils::temp_file::TempFileGuard;

use super::error::SplitError;
use super::probe::probe_duration;
use super::types::{SegmentSpan, SplitOptions, SplitPlan};

/// Pipeline de découpage et de stockage d'un fichier audio source.
///
/// Chaque appel à [`AudioSplitter::split`] est indépendant: les fichiers
/// temporaires portent un identifiant propre à l'appel, et aucun état n'est
/// conservé une fois les identifiants retournés. Plusieurs appels peuvent
/// donc tourner en parallèle sur des sources distinctes.
pub struct AudioSplitter {
    ffmpeg_path: String,
    ffprobe_path: String,
    store: Arc<dyn ChunkStore>,
    options: SplitOptions,
}

impl AudioSplitter {
    /// Construit le pipeline en résolvant ffmpeg et ffprobe immédiatement.
    pub fn new(store: Arc<dyn ChunkStore>, options: SplitOptions) -> Result<Self, SplitError> {
        let ffmpeg_path = resolve_tool_path(options.ffmpeg_path.as_deref(), "ffmpeg")?;
        let ffprobe_path = resolve_tool_path(options.ffprobe_path.as_deref(), "ffprobe")?;
        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
            store,
            options,
        })
    }

    /// Découpe `source` en chunks stockés et retourne leurs identifiants.
    ///
    /// L'ordre des identifiants est l'ordre chronologique dans la source. En
    /// cas d'échec au segment `k`, les chunks `0..k` restent stockés et aucun
    /// identifiant n'est retourné; l'appelant décide du nettoyage éventuel.
    pub fn split(&self, source: &Path) -> Result<Vec<ChunkId>, SplitError> {
        let source = normalize_existing_path(source);
        if !source.exists() {
            return Err(SplitError::Probe {
                detail: format!("audio file not found: {}", source.to_string_lossy()),
            });
        }

        let duration = probe_duration(&self.ffprobe_path, &source)?;
        log::info!("[split] audio duration: {:.1}s", duration);

        let plan = SplitPlan::for_duration(duration);
        match plan {
            SplitPlan::Whole => {
                log::info!("[split] audio under the split threshold, uploading directly");
                let id = self.upload_chunk(&source, 0)?;
                log::info!("[split] source uploaded with id {}", id);
                Ok(vec![id])
            }
            SplitPlan::Segments { count } => {
                log::info!(
                    "[split] audio over the split threshold, extracting {} chunks",
                    count
                );
                let call_id = Uuid::new_v4().simple().to_string();
                let extension = source
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("mp3")
                    .to_string();

                let mut chunk_ids = Vec::with_capacity(count);
                for span in plan.spans() {
                    let temp_path = self.temp_chunk_path(&call_id, span.index, &extension);
                    // La garde couvre extraction et upload: le fichier local
                    // disparaît sur chaque sortie, succès comme erreur.
                    let _guard = TempFileGuard(temp_path.clone());
                    log::debug!(
                        "[split] chunk {}/{} from {}s -> {}",
                        span.index + 1,
                        count,
                        span.start_secs,
                        temp_path.to_string_lossy()
                    );
                    self.extract_chunk(&source, span, &temp_path)?;
                    let id = self.upload_chunk(&temp_path, span.index)?;
                    log::info!("[split] chunk {}/{} uploaded with id {}", span.index + 1, count, id);
                    chunk_ids.push(id);
                }
                log::info!("[split] audio processing complete ({} chunks)", chunk_ids.len());
                Ok(chunk_ids)
            }
        }
    }

    /// Chemin temporaire unique par appel pour un index de chunk donné.
    fn temp_chunk_path(&self, call_id: &str, index: usize, extension: &str) -> PathBuf {
        let dir = self
            .options
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        dir.join(format!("audioscribe-chunk-{}-{}.{}", index, call_id, extension))
    }

    /// Extrait la fenêtre `span` de la source vers `output_path` par copie de flux.
    fn extract_chunk(
        &self,
        source: &Path,
        span: SegmentSpan,
        output_path: &Path,
    ) -> Result<(), SplitError> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args([
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-ss",
            &span.start_secs.to_string(),
            "-t",
            &span.length_secs.to_string(),
        ]);
        cmd.arg("-i").arg(source);
        cmd.args(["-c", "copy"]);
        cmd.arg(output_path);
        configure_command_no_window(&mut cmd);

        match run_with_timeout(&mut cmd, self.options.tool_timeout) {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(SplitError::ToolExecution {
                index: span.index,
                code: output.status.code(),
                detail: sanitize_cmd_error(&output),
            }),
            Err(e) => Err(SplitError::ToolExecution {
                index: span.index,
                code: None,
                detail: format!("unable to execute ffmpeg: {}", e),
            }),
        }
    }

    /// Copie un fichier local dans le store et retourne l'identifiant attribué.
    fn upload_chunk(&self, file_path: &Path, index: usize) -> Result<ChunkId, SplitError> {
        let name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("chunk-{}", index));

        let mut upload = self
            .store
            .open_upload_stream(&name)
            .map_err(|e| SplitError::Storage { index, source: e })?;
        let mut file = File::open(file_path).map_err(|e| SplitError::Storage {
            index,
            source: StoreError::Io(e),
        })?;
        io::copy(&mut file, &mut upload).map_err(|e| SplitError::Storage {
            index,
            source: StoreError::Io(e),
        })?;
        upload
            .finish()
            .map_err(|e| SplitError::Storage { index, source: e })
    }
}

/// Résout l'outil `name`, sauf si un chemin est imposé par les options.
fn resolve_tool_path(override_path: Option<&Path>, name: &str) -> Result<String, SplitError> {
    match override_path {
        Some(path) => Ok(path.to_string_lossy().to_string()),
        None => binaries::resolve_tool(name).map_err(SplitError::ToolUnavailable),
    }
}
