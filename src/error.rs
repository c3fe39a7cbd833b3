use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised while scraping a single page or asset.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The site answers with a redirect when no book exists at the requested address.
    #[error("no book at {url} (redirected)")]
    NotFound { url: String },

    #[error("GET {url} failed{}", status_suffix(.status))]
    Transport {
        url: String,
        status: Option<StatusCode>,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("unexpected page structure at {url}: {what}")]
    Parse { url: String, what: String },

    #[error("no plain-text edition at {url}")]
    MissingTextEdition { url: String },

    #[error("write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn status_suffix(status: &Option<StatusCode>) -> String {
    status
        .map(|status| format!(" with status {status}"))
        .unwrap_or_default()
}

impl ScrapeError {
    pub fn status(url: impl Into<String>, status: StatusCode) -> Self {
        Self::Transport {
            url: url.into(),
            status: Some(status),
            source: None,
        }
    }

    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            status: source.status(),
            source: Some(source),
        }
    }

    pub fn parse(url: impl Into<String>, what: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            what: what.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
