//! Headerless raw buffer reading and writing
//!
//! A raw file holds exactly `width * height` bytes. Short and long files
//! are both rejected, since the dimensions cannot be inferred from the
//! contents.

use crate::{IoError, IoResult};
use crossmorph_core::{Dimensions, PixelBuffer};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Read a raw buffer of shape `dims` from a file.
pub fn read_raw<P: AsRef<Path>>(path: P, dims: Dimensions) -> IoResult<PixelBuffer> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let pix = read_raw_from(BufReader::new(file), dims)?;
    debug!(path = %path.display(), dims = %dims, "read raw buffer");
    Ok(pix)
}

/// Read a raw buffer of shape `dims` from a reader.
///
/// Fails with [`IoError::InvalidData`] unless the reader yields exactly
/// `dims.area()` bytes.
pub fn read_raw_from<R: Read>(reader: R, dims: Dimensions) -> IoResult<PixelBuffer> {
    let expected = dims.area();

    // One extra byte is enough to detect trailing data.
    let mut data = Vec::new();
    data.try_reserve_exact(expected + 1)
        .map_err(|_| crossmorph_core::Error::AllocationFailed { bytes: expected })?;
    reader.take(expected as u64 + 1).read_to_end(&mut data)?;

    if data.len() != expected {
        return Err(IoError::InvalidData(if data.len() > expected {
            format!("more than {} bytes for a {} image", expected, dims)
        } else {
            format!(
                "expected {} bytes for a {} image, found {}",
                expected,
                dims,
                data.len()
            )
        }));
    }

    Ok(PixelBuffer::from_parts(dims, data)?)
}

/// Write a buffer's bytes to a file, replacing any existing file.
pub fn write_raw<P: AsRef<Path>>(path: P, pix: &PixelBuffer) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_raw_to(BufWriter::new(file), pix)?;
    debug!(path = %path.display(), bytes = pix.len(), "wrote raw buffer");
    Ok(())
}

/// Write a buffer's bytes to a writer.
pub fn write_raw_to<W: Write>(mut writer: W, pix: &PixelBuffer) -> IoResult<()> {
    writer.write_all(pix.data())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dims8() -> Dimensions {
        Dimensions::new(8, 8).unwrap()
    }

    #[test]
    fn test_read_exact_size() {
        let bytes: Vec<u8> = (0..64).collect();
        let pix = read_raw_from(Cursor::new(bytes.clone()), dims8()).unwrap();
        assert_eq!(pix.data(), &bytes[..]);
        assert_eq!(pix.get_pixel(1, 2), Some(17));
    }

    #[test]
    fn test_read_short_and_long() {
        let err = read_raw_from(Cursor::new(vec![0u8; 63]), dims8()).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(ref m) if m.contains("found 63")));

        let err = read_raw_from(Cursor::new(vec![0u8; 65]), dims8()).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(ref m) if m.contains("more than 64")));
    }

    #[test]
    fn test_write_to_writer() {
        let pix = PixelBuffer::filled(16, 4, 9).unwrap();
        let mut out = Vec::new();
        write_raw_to(&mut out, &pix).unwrap();
        assert_eq!(out, vec![9u8; 64]);
    }
}
