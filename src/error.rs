use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    CitationPattern(regex::Error),
    UnsupportedVersion {
        found: u32,
        expected: u32,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            LoadError::Json(err) => write!(f, "invalid JSON document: {err}"),
            LoadError::CitationPattern(err) => write!(f, "invalid citation pattern: {err}"),
            LoadError::UnsupportedVersion { found, expected } => write!(
                f,
                "unsupported search config version {found} (expected {expected})"
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Json(err) => Some(err),
            LoadError::CitationPattern(err) => Some(err),
            LoadError::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(value: serde_json::Error) -> Self {
        LoadError::Json(value)
    }
}

impl From<regex::Error> for LoadError {
    fn from(value: regex::Error) -> Self {
        LoadError::CitationPattern(value)
    }
}
