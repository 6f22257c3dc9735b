use redis_protocol::resp2::types::OwnedFrame as RespFrame;
use thiserror::Error;

/// Malformed command or parameters. Rejected at the request boundary,
/// before anything reaches a queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRequest {
    #[error("expected array")]
    ExpectedArray,

    #[error("empty command")]
    EmptyCommand,

    #[error("invalid command format")]
    InvalidCommandFormat,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("wrong number of arguments for '{0}' command")]
    WrongArity(&'static str),

    #[error("invalid string")]
    InvalidString,

    #[error("value must not be empty")]
    EmptyValue,

    #[error("timeout is not a number of seconds")]
    InvalidTimeout,

    #[error("timeout must be non-negative")]
    NegativeTimeout,
}

impl From<InvalidRequest> for RespFrame {
    fn from(err: InvalidRequest) -> Self {
        RespFrame::Error(format!("ERR {}", err))
    }
}
