use std::fmt;

/// Decrit une tentative de resolution d'un outil externe.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ToolResolutionAttempt {
    /// Chemin ou nom tente.
    pub candidate: String,
    /// Source de la tentative (chemin connu, PATH systeme).
    pub source: String,
    /// Resultat de la tentative.
    pub outcome: String,
    /// Detail eventuel en cas d'erreur.
    pub detail: Option<String>,
}

/// Erreur structuree de resolution d'un outil externe.
#[derive(Clone, Debug)]
pub struct ToolResolveError {
    /// Code d'erreur stable cote application.
    pub code: String,
    /// Message de diagnostic principal.
    pub details: String,
    /// Historique complet des tentatives.
    pub attempts: Vec<ToolResolutionAttempt>,
}

impl fmt::Display for ToolResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.details)
    }
}

impl std::error::Error for ToolResolveError {}
