use std::io;

use thiserror::Error;

use super::{SmtpReply, Stage};

#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("timed out during {stage}")]
    Timeout { stage: Stage },
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("{stage} refused: {reply}")]
    UnexpectedReply { stage: Stage, reply: SmtpReply },
}

impl SmtpError {
    pub(crate) fn io(stage: Stage, source: io::Error) -> Self {
        Self::Io { stage, source }
    }

    /// Whether the connection is still usable for a polite `QUIT`.
    pub(crate) fn connection_usable(&self) -> bool {
        matches!(self, Self::UnexpectedReply { .. })
    }
}

/// A dialogue that ended before `RCPT TO` was answered.
#[derive(Debug, Error)]
#[error("{host}: {source}")]
pub struct DialogueError {
    pub host: String,
    /// Commands sent before the failure.
    pub commands: u32,
    #[source]
    pub source: SmtpError,
}

impl DialogueError {
    pub fn new(host: impl Into<String>, commands: u32, source: SmtpError) -> Self {
        Self {
            host: host.into(),
            commands,
            source,
        }
    }
}
