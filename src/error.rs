use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchdError {
    #[error("command is empty, a job needs at least a program name")]
    EmptyCommand,

    #[error("command has {0} words, at most 5 (program plus four arguments) are accepted")]
    TooManyWords(usize),

    #[error("start delay is not a non-negative number of seconds: {0:?}")]
    InvalidDelay(String),

    #[error("scheduler is no longer accepting requests")]
    IntakeClosed,
}

pub type Result<T> = std::result::Result<T, BatchdError>;
