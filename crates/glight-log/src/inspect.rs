use std::io::Read;

use glight_types::Record;

use crate::codec::{LogReader, ReaderOptions};
use crate::error::Result;

/// Read the raw contents of a log without reconstructing anything.
///
/// Meant for debugging: the records come back exactly as stored, reference
/// markers unresolved.
pub fn inspect<R: Read>(source: R) -> Result<Vec<Record>> {
    inspect_with(source, ReaderOptions::default())
}

pub fn inspect_with<R: Read>(source: R, options: ReaderOptions) -> Result<Vec<Record>> {
    LogReader::with_options(source, options).collect()
}
