use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Digital output {channel} does not exist")]
    InvalidChannel { channel: i32 },

    #[error("Invalid pin level: {0}")]
    InvalidPinLevel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
