use crate::notify::Severity;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failure parsing history {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Config(String),

    #[error("{0} is not installed")]
    ToolNotFound(String),

    #[error("{tool} failed: {status}")]
    ToolExecution {
        tool: String,
        status: std::process::ExitStatus,
    },

    #[error("couldn't recover original string")]
    Recovery,

    #[error("nothing to show: no data available")]
    NoData,

    #[error("clipboard: {0}")]
    Serve(String),
}

impl Error {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// How loudly this error should be surfaced to the desktop.
    pub fn severity(&self) -> Severity {
        match self {
            Error::Io { .. } | Error::Format { .. } => Severity::Critical,
            Error::Serve(_) => Severity::Low,
            _ => Severity::Normal,
        }
    }
}

pub trait IoResultExt<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::io(f(), e))
    }
}
