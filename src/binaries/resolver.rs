use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use crate::utils::process::configure_command_no_window;

use super::diagnostics::{ToolResolutionAttempt, ToolResolveError};

static TOOLS_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialise le repertoire prioritaire de recherche des outils externes.
pub fn init_tools_dir(dir: PathBuf) {
    let _ = TOOLS_DIR.set(dir);
}

/// Retourne la liste ordonnee des emplacements candidats pour un outil donne.
fn tool_candidates(bin: &str) -> Vec<PathBuf> {
    let mut paths = vec![Path::new("tools").join(bin)];

    if let Some(tools_dir) = TOOLS_DIR.get() {
        paths.push(tools_dir.join(bin));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            paths.push(dir.join("tools").join(bin));
            paths.push(dir.join(bin));
        }
    }

    #[cfg(target_os = "linux")]
    {
        paths.push(Path::new("/usr/local/bin").join(bin));
        paths.push(Path::new("/usr/bin").join(bin));
        paths.push(Path::new("/bin").join(bin));
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(Path::new("/opt/homebrew/bin").join(bin));
        paths.push(Path::new("/usr/local/bin").join(bin));
        paths.push(Path::new("/opt/local/bin").join(bin));
    }

    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        paths.push(Path::new(&manifest_dir).join("tools").join(bin));
    }

    dedupe_paths(paths)
}

/// Supprime les chemins dupliques en conservant l'ordre.
fn dedupe_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for path in paths {
        let key = path.to_string_lossy().to_string();
        if seen.insert(key) {
            deduped.push(path);
        }
    }
    deduped
}

/// Retourne la premiere ligne non vide d'un texte.
fn first_non_empty_line(text: &str) -> String {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| text.trim().to_string())
}

/// Classe une erreur de lancement de process en resultat applicatif stable.
fn classify_spawn_error(error: &std::io::Error) -> (&'static str, String) {
    if error.kind() == ErrorKind::NotFound {
        return ("missing", "Tool not found".to_string());
    }

    if error.kind() == ErrorKind::PermissionDenied {
        return (
            "not_executable",
            "Permission denied while executing tool".to_string(),
        );
    }

    let msg = error.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("exec format error")
        || lower.contains("bad cpu type")
        || lower.contains("cannot execute")
    {
        return ("not_executable", msg);
    }

    ("exec_failed", msg)
}

/// Verifie qu'un outil peut etre execute via son flag de version.
fn test_tool_version(candidate: &str) -> Result<(), (String, String)> {
    let mut cmd = Command::new(candidate);
    cmd.arg("-version");
    configure_command_no_window(&mut cmd);
    match cmd.output() {
        Ok(output) => {
            if output.status.success() {
                Ok(())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stdout = String::from_utf8_lossy(&output.stdout);
                let detail = first_non_empty_line(&stderr);
                let detail = if detail.is_empty() {
                    first_non_empty_line(&stdout)
                } else {
                    detail
                };
                Err((
                    "exec_failed".to_string(),
                    if detail.is_empty() {
                        "Tool returned non-zero exit status".to_string()
                    } else {
                        detail
                    },
                ))
            }
        }
        Err(error) => {
            let (outcome, detail) = classify_spawn_error(&error);
            Err((outcome.to_string(), detail))
        }
    }
}

/// Tente de resoudre un outil et retourne le chemin retenu plus les tentatives.
fn resolve_tool_with_attempts(
    name: &str,
) -> Result<(String, Vec<ToolResolutionAttempt>), ToolResolveError> {
    let bin = if cfg!(target_os = "windows") {
        format!("{name}.exe")
    } else {
        name.to_string()
    };

    let mut attempts = Vec::new();

    for path in tool_candidates(&bin) {
        if path.exists() {
            let canonical = path.canonicalize().unwrap_or(path);
            let candidate = canonical.to_string_lossy().to_string();
            match test_tool_version(&candidate) {
                Ok(()) => {
                    attempts.push(ToolResolutionAttempt {
                        candidate: candidate.clone(),
                        source: "known_path".to_string(),
                        outcome: "ok".to_string(),
                        detail: None,
                    });
                    return Ok((candidate, attempts));
                }
                Err((outcome, detail)) => {
                    attempts.push(ToolResolutionAttempt {
                        candidate,
                        source: "known_path".to_string(),
                        outcome,
                        detail: Some(detail),
                    });
                }
            }
        } else {
            attempts.push(ToolResolutionAttempt {
                candidate: path.to_string_lossy().to_string(),
                source: "known_path".to_string(),
                outcome: "missing".to_string(),
                detail: None,
            });
        }
    }

    let base = bin.strip_suffix(".exe").unwrap_or(&bin);
    for candidate in [bin.as_str(), base] {
        match test_tool_version(candidate) {
            Ok(()) => {
                attempts.push(ToolResolutionAttempt {
                    candidate: candidate.to_string(),
                    source: "system_path".to_string(),
                    outcome: "ok".to_string(),
                    detail: None,
                });
                return Ok((candidate.to_string(), attempts));
            }
            Err((outcome, detail)) => {
                attempts.push(ToolResolutionAttempt {
                    candidate: candidate.to_string(),
                    source: "system_path".to_string(),
                    outcome,
                    detail: Some(detail),
                });
            }
        }
    }

    let has_not_executable = attempts.iter().any(|a| a.outcome == "not_executable");
    let has_exec_failed = attempts.iter().any(|a| a.outcome == "exec_failed");
    let details = attempts
        .iter()
        .find_map(|a| a.detail.clone())
        .unwrap_or_else(|| format!("No usable tool found for {name}"));
    let code = if has_not_executable {
        "TOOL_NOT_EXECUTABLE"
    } else if has_exec_failed {
        "TOOL_EXEC_FAILED"
    } else {
        "TOOL_NOT_FOUND"
    };

    Err(ToolResolveError {
        code: code.to_string(),
        details,
        attempts,
    })
}

/// Retourne le chemin de l'outil ou une erreur structuree.
pub fn resolve_tool(name: &str) -> Result<String, ToolResolveError> {
    resolve_tool_with_attempts(name).map(|(path, _)| path)
}
