//! Change log framing for glight.
//!
//! A log is an append-only byte stream of framed [`Record`](glight_types::Record)s.
//! The stream is owned by the caller: this crate only writes to and reads
//! from it, and never opens, seeks or closes it.
//!
//! ```text
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (bincode-serialized Record)]
//! ```
//!
//! Reaching the end of the stream on a frame boundary is the normal way a
//! read finishes. A frame cut short by the end of the stream is a torn
//! tail; [`TailPolicy`] decides whether that is an error.

pub mod codec;
pub mod error;
pub mod inspect;

pub use codec::{
    encode_record, LogReader, LogWriter, ReaderOptions, TailPolicy, DEFAULT_MAX_RECORD_SIZE,
    HEADER_SIZE,
};
pub use error::{LogError, Result};
pub use inspect::{inspect, inspect_with};
