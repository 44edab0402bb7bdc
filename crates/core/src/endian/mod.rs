//! Byte-order helpers used by the container parser.
//!
//! RIFF mixes endianness: chunk identifiers compare most naturally as
//! big-endian 32-bit values while every size and sample field is
//! little-endian. The readers here are explicit about byte order and are
//! independent of the host, so the parser never touches raw indexing.

use crate::{Result, WavVizError};

/// Reads an unsigned 16-bit little-endian value at `offset`.
pub fn read_u16_le(bytes: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_le_bytes(take::<2>(bytes, offset)?))
}

/// Reads an unsigned 16-bit big-endian value at `offset`.
pub fn read_u16_be(bytes: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_be_bytes(take::<2>(bytes, offset)?))
}

/// Reads an unsigned 32-bit little-endian value at `offset`.
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(take::<4>(bytes, offset)?))
}

/// Reads an unsigned 32-bit big-endian value at `offset`.
///
/// Chunk identifiers ("RIFF", "fmt ", ...) are compared as big-endian
/// values so the four ASCII bytes collapse into one integer comparison.
pub fn read_u32_be(bytes: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_be_bytes(take::<4>(bytes, offset)?))
}

/// Reads a signed 16-bit little-endian value at `offset`, the encoding of
/// every PCM sample this crate handles.
pub fn read_i16_le(bytes: &[u8], offset: usize) -> Result<i16> {
    Ok(i16::from_le_bytes(take::<2>(bytes, offset)?))
}

fn take<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    let window = offset
        .checked_add(N)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(WavVizError::TruncatedData(
            "byte range ends before the value it should hold",
        ))?;
    let mut raw = [0u8; N];
    raw.copy_from_slice(window);
    Ok(raw)
}
