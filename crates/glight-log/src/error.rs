use std::io;

/// Errors produced while writing or reading a change log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// I/O error from the caller-supplied stream.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Payload does not match its stored checksum.
    #[error("CRC integrity check failed at offset {offset}: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        offset: u64,
        expected: u32,
        actual: u32,
    },

    /// Length prefix is zero or above the configured maximum.
    #[error("invalid log entry length {length} at offset {offset}")]
    InvalidEntryLength { offset: u64, length: u32 },

    /// A record encodes to more bytes than readers accept.
    #[error("record of {length} bytes exceeds the {limit} byte limit")]
    RecordTooLarge { length: usize, limit: u32 },

    /// The stream ended in the middle of a frame.
    #[error("log entry at offset {offset} is truncated")]
    TruncatedEntry { offset: u64 },
}

/// Convenience alias used throughout the log crate.
pub type Result<T> = std::result::Result<T, LogError>;
