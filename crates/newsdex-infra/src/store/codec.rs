//! Binary layout of `vectors.bin`.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "NDXF"
//! 4       4     format version (u32 LE)
//! 8       8     dimension (u64 LE)
//! 16      8     row count (u64 LE)
//! 24      ..    rows * dimension f32 LE, row-major
//! ```

use newsdex_core::index::{FlatIndex, VectorIndex};
use newsdex_types::error::IndexError;

const MAGIC: &[u8; 4] = b"NDXF";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 24;

/// Serialize an index into the `vectors.bin` layout.
pub fn encode(index: &FlatIndex) -> Vec<u8> {
    let floats = index.as_slice();
    let mut out = Vec::with_capacity(HEADER_LEN + floats.len() * 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(index.dimension() as u64).to_le_bytes());
    out.extend_from_slice(&(index.len() as u64).to_le_bytes());
    for value in floats {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Parse a `vectors.bin` payload. Any deviation from the layout is
/// `CorruptState`.
pub fn decode(bytes: &[u8]) -> Result<FlatIndex, IndexError> {
    if bytes.len() < HEADER_LEN {
        return Err(corrupt(format!(
            "vectors file is {} bytes, shorter than its header",
            bytes.len()
        )));
    }
    if &bytes[..4] != MAGIC {
        return Err(corrupt("vectors file has wrong magic".to_string()));
    }

    let version = read_u32(bytes, 4)?;
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported vectors format version {version}")));
    }

    let dimension = to_usize(read_u64(bytes, 8)?)?;
    let rows = to_usize(read_u64(bytes, 16)?)?;

    let payload = &bytes[HEADER_LEN..];
    let expected = rows
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| corrupt(format!("{rows} rows of dimension {dimension} overflow")))?;
    if payload.len() != expected {
        return Err(corrupt(format!(
            "expected {expected} payload bytes for {rows}x{dimension}, found {}",
            payload.len()
        )));
    }

    let data = payload
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    FlatIndex::from_raw_parts(dimension, rows, data)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, IndexError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|slice| <[u8; 4]>::try_from(slice).ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| corrupt(format!("truncated header at offset {offset}")))
}

fn read_u64(bytes: &[u8], offset: usize) -> Result<u64, IndexError> {
    bytes
        .get(offset..offset + 8)
        .and_then(|slice| <[u8; 8]>::try_from(slice).ok())
        .map(u64::from_le_bytes)
        .ok_or_else(|| corrupt(format!("truncated header at offset {offset}")))
}

fn to_usize(value: u64) -> Result<usize, IndexError> {
    usize::try_from(value).map_err(|_| corrupt(format!("header value {value} exceeds usize")))
}

fn corrupt(message: String) -> IndexError {
    IndexError::CorruptState(message)
}
