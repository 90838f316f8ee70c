use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory on this system")]
    NoConfigDir,

    #[error("config io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown backend '{0}' (expected one of: gpt, claude, gemini, ollama)")]
    UnknownBackend(String),

    #[error("{var} is not set")]
    MissingApiKey { var: &'static str },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{backend} returned HTTP {status}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),
}

/// Failures of the interactive helper. Always recovered by a plain-text fallback.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("'{0}' not found")]
    HelperMissing(String),

    #[error("'{program}' exited with status {code:?}")]
    HelperFailed { program: String, code: Option<i32> },

    #[error("ui io: {0}")]
    Io(#[from] std::io::Error),
}
