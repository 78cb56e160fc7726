//! INI-like profile file codec
//!
//! ```text
//! [default]
//! host=https://openapi.samsungsdscloud.com
//! project-id=PROJECT-abc
//! ```
//!
//! Section names keep their brackets: the line `[default]` opens the
//! section named `[default]`. Entries before the first header belong to the
//! section named `""`.

use crate::error::{ProfileError, Result};
use crate::profile::Profile;
use std::io::{BufRead, Read, Write};

/// Longest line the decoder reads in one go, excluding the line terminator
///
/// A longer line ends decoding: everything decoded so far is kept and the
/// rest of the input is ignored.
pub const MAX_LINE_LENGTH: usize = 4096;

fn is_section_header(line: &str) -> bool {
    line.len() > 2 && line.starts_with('[') && line.ends_with(']')
}

/// Decode a profile from a reader
pub fn decode<R: BufRead>(name: &str, mut reader: R) -> Result<Profile> {
    let mut profile = Profile::new(name);
    let mut current_section = String::new();
    let mut buf = Vec::with_capacity(256);
    let mut line_no = 0usize;

    loop {
        buf.clear();
        // room for the line plus a CRLF terminator
        let read = (&mut reader)
            .take(MAX_LINE_LENGTH as u64 + 2)
            .read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let body = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let body = body.strip_suffix(b"\r").unwrap_or(body);
        if body.len() > MAX_LINE_LENGTH {
            tracing::warn!(
                profile = name,
                line = line_no,
                "Line exceeds {} bytes, stopping profile decode",
                MAX_LINE_LENGTH
            );
            break;
        }

        let text = std::str::from_utf8(&buf)
            .map_err(|_| ProfileError::InvalidInput(String::from_utf8_lossy(&buf).into_owned()))?;
        let line = text.trim_end_matches(['\n', '\r']);

        if line.trim().is_empty() {
            continue;
        }

        if is_section_header(line) {
            current_section = line.to_string();
            continue;
        }

        profile.add_property(&current_section, line)?;
    }

    tracing::debug!(
        profile = name,
        sections = profile.len(),
        "Decoded profile file"
    );
    Ok(profile)
}

/// Decode a profile from a string
pub fn decode_str(name: &str, content: &str) -> Result<Profile> {
    decode(name, content.as_bytes())
}

/// Encode a profile
///
/// The unnamed section comes first, then sections in lexicographic order,
/// each followed by its entries sorted by key. Empty sections are skipped.
/// No quoting or escaping is performed.
pub fn encode<W: Write>(profile: &Profile, mut writer: W) -> Result<()> {
    let mut first = true;

    for name in profile.section_names() {
        let Some(section) = profile.section(name) else {
            continue;
        };
        if section.is_empty() {
            continue;
        }

        if !first {
            writeln!(writer)?;
        }
        first = false;

        if !name.is_empty() {
            if is_section_header(name) {
                writeln!(writer, "{}", name)?;
            } else {
                writeln!(writer, "[{}]", name)?;
            }
        }

        for (key, value) in section.entries() {
            writeln!(writer, "{}={}", key, value)?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Encode a profile into a string
pub fn encode_to_string(profile: &Profile) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = encode(profile, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}
