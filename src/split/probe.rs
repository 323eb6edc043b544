use std::path::Path;
use std::process::Command;

use crate::utils::process::{configure_command_no_window, sanitize_cmd_error};

use super::error::SplitError;

/// Retourne la durée d'un média en secondes via ffprobe.
pub fn probe_duration(ffprobe_path: &str, file_path: &Path) -> Result<f64, SplitError> {
    let mut cmd = Command::new(ffprobe_path);
    cmd.args(["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0"]);
    cmd.arg(file_path);
    configure_command_no_window(&mut cmd);

    let output = cmd.output().map_err(|e| SplitError::Probe {
        detail: format!("unable to execute ffprobe: {}", e),
    })?;
    if !output.status.success() {
        return Err(SplitError::Probe {
            detail: sanitize_cmd_error(&output),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration_line = stdout.trim();
    let duration: f64 = duration_line.parse().map_err(|_| SplitError::Probe {
        detail: format!("unable to parse ffprobe duration output '{}'", duration_line),
    })?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(SplitError::Probe {
            detail: format!("invalid audio duration: {}", duration),
        });
    }
    Ok(duration)
}
