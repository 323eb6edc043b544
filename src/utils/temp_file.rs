use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Garde RAII qui supprime automatiquement un fichier temporaire à la sortie de scope.
pub struct TempFileGuard(pub PathBuf);

impl Drop for TempFileGuard {
    /// Supprime le fichier temporaire; un échec est journalisé sans être propagé.
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.0) {
            if e.kind() != ErrorKind::NotFound {
                log::warn!(
                    "[temp] failed to delete temporary file {}: {}",
                    self.0.to_string_lossy(),
                    e
                );
            }
        }
    }
}
