//! Buffer-filling queries
//!
//! Directory queries that return variable-length data come in two shapes:
//!
//! - **two-phase**: ask with an empty buffer to learn the required size, then
//!   allocate exactly that and ask again (interface detail records)
//! - **bounded**: a single read into a fixed-capacity buffer (device ids,
//!   string properties)
//!
//! Both take the query as a closure over the buffer so backends only implement
//! "fill this slice".

use crate::error::FetchError;
use crate::types::Fetched;

/// Run a size-negotiated query.
///
/// The first call gets a zero-capacity buffer and must fail with
/// [`FetchError::BufferTooSmall`]. Any other first-call outcome, including a
/// reported size of zero, is an error and no allocation happens.
pub fn two_phase<T, R, F>(mut query: F) -> Result<(Vec<T>, R), FetchError>
where
    T: Copy + Default,
    F: FnMut(&mut [T]) -> Result<Fetched<R>, FetchError>,
{
    let mut empty: [T; 0] = [];
    let required = match query(&mut empty[..]) {
        Err(FetchError::BufferTooSmall { required }) => required,
        Err(e) => return Err(e),
        Ok(_) => return Err(FetchError::NoSizeReported),
    };
    if required == 0 {
        return Err(FetchError::NoSizeReported);
    }

    let mut buf = vec![T::default(); required];
    let fetched = query(&mut buf[..])?;
    buf.truncate(fetched.len.min(required));
    Ok((buf, fetched.value))
}

/// Run a single query into a buffer of `capacity` units.
///
/// Truncation of oversized data is left to the directory.
pub fn bounded<T, R, F>(capacity: usize, query: F) -> Result<(Vec<T>, R), FetchError>
where
    T: Copy + Default,
    F: FnOnce(&mut [T]) -> Result<Fetched<R>, FetchError>,
{
    let mut buf = vec![T::default(); capacity];
    let fetched = query(&mut buf[..])?;
    buf.truncate(fetched.len.min(capacity));
    Ok((buf, fetched.value))
}

/// Decode UTF-16 text up to the first NUL
pub fn utf16_to_string(units: &[u16]) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

/// Decode UTF-16LE bytes up to the first NUL unit
pub fn utf16le_bytes_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    utf16_to_string(&units)
}

/// Write `text` into `buf` as UTF-16, cut at the buffer end.
///
/// Returns the number of units written.
pub fn write_utf16(text: &str, buf: &mut [u16]) -> usize {
    let mut written = 0;
    for (slot, unit) in buf.iter_mut().zip(text.encode_utf16()) {
        *slot = unit;
        written += 1;
    }
    written
}
