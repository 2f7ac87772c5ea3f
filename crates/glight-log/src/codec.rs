use std::io::{self, Read, Write};

use glight_types::Record;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{LogError, Result};

/// Header size: 4 bytes length + 4 bytes CRC.
pub const HEADER_SIZE: usize = 8;

/// Default upper bound on a single encoded record (16 MiB).
pub const DEFAULT_MAX_RECORD_SIZE: u32 = 16 * 1024 * 1024;

/// What to do when the stream ends in the middle of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// Report [`LogError::TruncatedEntry`].
    #[default]
    Reject,
    /// Stop reading at the last complete frame and log a warning.
    Ignore,
}

/// Options for [`LogReader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Frames with a larger length prefix are rejected.
    pub max_record_size: u32,
    pub tail_policy: TailPolicy,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            tail_policy: TailPolicy::default(),
        }
    }
}

/// Encode one record into a complete frame (header + payload).
pub fn encode_record(record: &Record) -> Result<Vec<u8>> {
    let payload =
        bincode::serialize(record).map_err(|e| LogError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len()).map_err(|_| {
        LogError::Serialization(format!("record of {} bytes is too large", payload.len()))
    })?;
    let crc = crc32fast::hash(&payload);

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Appends framed records to a caller-owned stream.
pub struct LogWriter<W> {
    sink: W,
    written: u64,
    max_record_size: u32,
}

impl<W: Write> LogWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_max_record_size(sink, DEFAULT_MAX_RECORD_SIZE)
    }

    /// A writer refusing records a reader with the same limit would reject.
    pub fn with_max_record_size(sink: W, max_record_size: u32) -> Self {
        Self {
            sink,
            written: 0,
            max_record_size,
        }
    }

    /// Append a single record. Returns the number of bytes written.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        self.append_batch(std::slice::from_ref(record))
    }

    /// Append records in order. Returns the number of bytes written.
    ///
    /// Every record is encoded and checked against the size limit before
    /// the first byte reaches the stream, so an encoding failure leaves the
    /// stream untouched. The frames then go out in a single `write_all`
    /// followed by `flush`. A `write_all` that fails partway can still
    /// leave a partial frame behind.
    pub fn append_batch(&mut self, records: &[Record]) -> Result<u64> {
        let mut buf = Vec::new();
        for record in records {
            let frame = encode_record(record)?;
            let length = frame.len() - HEADER_SIZE;
            if length > self.max_record_size as usize {
                return Err(LogError::RecordTooLarge {
                    length,
                    limit: self.max_record_size,
                });
            }
            buf.extend_from_slice(&frame);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        self.sink.write_all(&buf)?;
        self.sink.flush()?;

        let len = buf.len() as u64;
        self.written += len;
        debug!(records = records.len(), bytes = len, "log append");
        Ok(len)
    }

    /// Total bytes written through this writer.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Reads framed records from the current stream position to end-of-stream.
///
/// Iteration stops after the first error.
pub struct LogReader<R> {
    source: R,
    offset: u64,
    options: ReaderOptions,
    finished: bool,
}

impl<R: Read> LogReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: R, options: ReaderOptions) -> Self {
        Self {
            source,
            offset: 0,
            options,
            finished: false,
        }
    }

    /// Bytes consumed so far, relative to where reading started.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_frame(&mut self) -> Result<Option<Record>> {
        let mut header = [0u8; HEADER_SIZE];
        let got = read_full(&mut self.source, &mut header)?;
        if got == 0 {
            trace!(offset = self.offset, "end of log");
            return Ok(None);
        }
        if got < HEADER_SIZE {
            return self.torn_tail();
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || length > self.options.max_record_size {
            return Err(LogError::InvalidEntryLength {
                offset: self.offset,
                length,
            });
        }

        let mut payload = vec![0u8; length as usize];
        if read_full(&mut self.source, &mut payload)? < payload.len() {
            return self.torn_tail();
        }

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            return Err(LogError::CrcMismatch {
                offset: self.offset,
                expected: expected_crc,
                actual: actual_crc,
            });
        }

        let record: Record = bincode::deserialize(&payload)
            .map_err(|e| LogError::Serialization(e.to_string()))?;
        self.offset += (HEADER_SIZE + payload.len()) as u64;
        Ok(Some(record))
    }

    fn torn_tail(&mut self) -> Result<Option<Record>> {
        match self.options.tail_policy {
            TailPolicy::Reject => Err(LogError::TruncatedEntry {
                offset: self.offset,
            }),
            TailPolicy::Ignore => {
                warn!(offset = self.offset, "truncated log entry; stopping read");
                Ok(None)
            }
        }
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_frame() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the stream allows. Returns the number of bytes read,
/// which is less than `buf.len()` only at end-of-stream.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
