//! File name conventions
//!
//! Input names carry their dimensions as `<name>_<width>x<height>.<ext>`.
//! Output files are written next to the input with an `out_` prefix.

use crate::{IoError, IoResult};
use std::path::{Path, PathBuf};

/// Prefix added to the input file name to form the output name
pub const OUTPUT_PREFIX: &str = "out_";

/// Extract `(width, height)` from a file name like `pentagram_64x64.raw`.
///
/// Only the final path component is examined. The last `_<w>x<h>` group
/// that is followed by the end of the name or a `.` wins, so prefixed
/// names such as `out_pentagram_64x64.raw` parse as well. Returns `None`
/// when no such group exists or the part before it is empty.
///
/// The dimensions are not validated; see [`crossmorph_core::Dimensions`].
pub fn parse_dimensions<P: AsRef<Path>>(path: P) -> Option<(u32, u32)> {
    let name = path.as_ref().file_name()?.to_str()?;
    name.match_indices('_')
        .rev()
        .filter(|&(i, _)| i > 0)
        .find_map(|(i, _)| parse_size(&name[i + 1..]))
}

/// Parse `<w>x<h>` at the start of `s`, followed by end of string or `.`.
fn parse_size(s: &str) -> Option<(u32, u32)> {
    let (width, rest) = split_number(s)?;
    let rest = rest.strip_prefix('x')?;
    let (height, rest) = split_number(rest)?;
    if !(rest.is_empty() || rest.starts_with('.')) {
        return None;
    }
    Some((width, height))
}

fn split_number(s: &str) -> Option<(u32, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value = s[..digits].parse().ok()?;
    Some((value, &s[digits..]))
}

/// Output path for `input`: same directory, file name prefixed with
/// [`OUTPUT_PREFIX`].
pub fn output_path<P: AsRef<Path>>(input: P) -> IoResult<PathBuf> {
    let input = input.as_ref();
    let name = input.file_name().ok_or_else(|| {
        IoError::InvalidName(format!("'{}' has no file name", input.display()))
    })?;
    let mut out_name = std::ffi::OsString::from(OUTPUT_PREFIX);
    out_name.push(name);
    Ok(input.with_file_name(out_name))
}
