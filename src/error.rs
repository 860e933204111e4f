//! Error kinds shared by the pipeline stages.
//!
//! Every failure that can happen while importing a catalog or processing a
//! track is a [`PipelineError`]. Callers never match on the variants to decide
//! what to do next; they ask for the [`ErrorKind`] and its [`Disposition`].

use thiserror::Error;

/// Closed set of failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The external service has no such developer, track or clip.
    NotFound,
    /// The service kept answering 429 after the allowed retries.
    RateLimited,
    /// An external link or payload did not have the expected shape.
    Malformed,
    /// Loading audio or running one of the models failed.
    InferenceFailure,
    /// The downloaded container is larger than the configured limit.
    Oversized,
    /// Credentials were rejected.
    Auth,
    /// The download utility or the transcoder failed.
    Download,
    /// Any other non-success answer or transport failure.
    Upstream,
    /// The relational store or the local filesystem failed.
    Storage,
    /// The operator's input ended before a decision was made.
    Interrupted,
}

/// What the caller does with a failed unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Log it and continue with the next track or game.
    Skip,
    /// Stop the whole run. Checkpoints already written stay valid.
    Abort,
}

impl ErrorKind {
    pub fn disposition(self) -> Disposition {
        match self {
            ErrorKind::NotFound
            | ErrorKind::Malformed
            | ErrorKind::InferenceFailure
            | ErrorKind::Oversized
            | ErrorKind::Download
            | ErrorKind::Upstream => Disposition::Skip,
            // Retrying later gives a complete album; skipping would mark it processed with holes.
            ErrorKind::RateLimited | ErrorKind::Auth | ErrorKind::Storage | ErrorKind::Interrupted => {
                Disposition::Abort
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Malformed => "malformed",
            ErrorKind::InferenceFailure => "inference_failure",
            ErrorKind::Oversized => "oversized",
            ErrorKind::Auth => "auth",
            ErrorKind::Download => "download",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Storage => "storage",
            ErrorKind::Interrupted => "interrupted",
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by {service} after {retries} retries")]
    RateLimited { service: &'static str, retries: u8 },

    #[error("malformed {what}: {value}")]
    Malformed { what: &'static str, value: String },

    #[error("feature extraction failed: {0}")]
    Inference(String),

    #[error("downloaded file is {size} bytes, limit is {limit}")]
    Oversized { size: u64, limit: u64 },

    #[error("authentication failed against {service}: {message}")]
    Auth { service: &'static str, message: String },

    #[error("download failed: {0}")]
    Download(String),

    #[error("transcoding failed: {0}")]
    Transcode(String),

    #[error("{service} responded with status {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("request to {service} failed: {message}")]
    Transport { service: &'static str, message: String },

    #[error("input closed while choosing an album for {0}")]
    InputClosed(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::RateLimited { .. } => ErrorKind::RateLimited,
            PipelineError::Malformed { .. } => ErrorKind::Malformed,
            PipelineError::Inference(_) => ErrorKind::InferenceFailure,
            PipelineError::Oversized { .. } => ErrorKind::Oversized,
            PipelineError::Auth { .. } => ErrorKind::Auth,
            PipelineError::Download(_) | PipelineError::Transcode(_) => ErrorKind::Download,
            PipelineError::Status { .. } | PipelineError::Transport { .. } => ErrorKind::Upstream,
            PipelineError::Database(_) | PipelineError::Io(_) => ErrorKind::Storage,
            PipelineError::InputClosed(_) => ErrorKind::Interrupted,
        }
    }

    pub fn disposition(&self) -> Disposition {
        self.kind().disposition()
    }

    pub fn is_skip(&self) -> bool {
        self.disposition() == Disposition::Skip
    }

    /// Classify a non-success HTTP status from `service`.
    pub fn from_status(service: &'static str, status: u16, message: String) -> Self {
        match status {
            401 | 403 => PipelineError::Auth { service, message },
            404 => PipelineError::NotFound(format!("{service}: {message}")),
            _ => PipelineError::Status {
                service,
                status,
                message,
            },
        }
    }

    /// Classify a failed `ureq` call. A 429 that reaches this point has
    /// already used up whatever retries the caller allows.
    pub fn from_http(service: &'static str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(429, _) => PipelineError::RateLimited { service, retries: 0 },
            ureq::Error::Status(status, response) => {
                let message = response.into_string().unwrap_or_default();
                Self::from_status(service, status, message)
            }
            ureq::Error::Transport(transport) => PipelineError::Transport {
                service,
                message: transport.to_string(),
            },
        }
    }

    pub fn malformed(what: &'static str, value: impl Into<String>) -> Self {
        PipelineError::Malformed {
            what,
            value: value.into(),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
