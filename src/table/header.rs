//! Count Header
//!
//! Explicit little-endian encoding of the 8-byte row count so the format
//! does not depend on the host's integer layout.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::Result;

use super::HEADER_SIZE;

/// Encode a row count as it appears on disk
pub fn encode_count(count: u64) -> [u8; HEADER_SIZE as usize] {
    count.to_le_bytes()
}

/// Decode an on-disk row count
pub fn decode_count(bytes: [u8; HEADER_SIZE as usize]) -> u64 {
    u64::from_le_bytes(bytes)
}

/// Read the row count from offset 0
///
/// Leaves the cursor at the first row.
pub fn read_count<R: Read + Seek>(reader: &mut R) -> Result<u64> {
    reader.seek(SeekFrom::Start(0))?;

    let mut header = [0u8; HEADER_SIZE as usize];
    reader.read_exact(&mut header)?;

    Ok(decode_count(header))
}

/// Overwrite the row count at offset 0
pub fn write_count<W: Write + Seek>(writer: &mut W, count: u64) -> Result<()> {
    writer.seek(SeekFrom::Start(0))?;
    writer.write_all(&encode_count(count))?;
    Ok(())
}
