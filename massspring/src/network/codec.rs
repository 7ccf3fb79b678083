//! Line protocol for streaming positions
//!
//! Messages are newline-delimited ASCII:
//!
//! ```text
//! mass            spring
//! x,y,z           x1,y1,z1;x2,y2,z2
//! ...             ...
//! ```
//!
//! On the wire each payload is preceded by its byte length as a decimal line.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::simulation::engine::Snapshot;
use crate::simulation::states::NVec3;

pub const MASS_HEADER: &str = "mass";
pub const SPRING_HEADER: &str = "spring";

/// Tokens that end a client session
pub const CONTROL_TOKENS: [&str; 2] = ["exit", "quit"];

/// Refuse frames above this size instead of allocating blindly
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("expected header {expected:?}, got {found:?}")]
    Header { expected: &'static str, found: String },

    #[error("line {line}: {reason}")]
    Line { line: usize, reason: String },

    #[error("bad length prefix {0:?}")]
    Length(String),

    #[error("frame of {0} bytes exceeds the limit")]
    TooLarge(usize),

    #[error("connection closed")]
    Closed,
}

fn push_vec(out: &mut String, p: &NVec3) {
    out.push_str(&format!("{},{},{}", p.x, p.y, p.z));
}

/// `mass` followed by one `x,y,z` line per body
pub fn encode_masses(snapshot: &Snapshot) -> String {
    let mut out = String::from(MASS_HEADER);
    out.push('\n');
    for p in &snapshot.masses {
        push_vec(&mut out, p);
        out.push('\n');
    }
    out
}

/// `spring` followed by one `x1,y1,z1;x2,y2,z2` line per spring
pub fn encode_springs(snapshot: &Snapshot) -> String {
    let mut out = String::from(SPRING_HEADER);
    out.push('\n');
    for (a, b) in &snapshot.springs {
        push_vec(&mut out, a);
        out.push(';');
        push_vec(&mut out, b);
        out.push('\n');
    }
    out
}

fn parse_vec(text: &str, line: usize) -> Result<NVec3, CodecError> {
    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != 3 {
        return Err(CodecError::Line {
            line,
            reason: format!("expected 3 fields, got {}", fields.len()),
        });
    }
    let mut v = NVec3::zeros();
    for (i, field) in fields.iter().enumerate() {
        v[i] = field.parse().map_err(|e| CodecError::Line {
            line,
            reason: format!("{field:?}: {e}"),
        })?;
    }
    Ok(v)
}

/// Split a payload into body lines after checking the header
fn body_lines<'a>(payload: &'a str, expected: &'static str) -> Result<impl Iterator<Item = (usize, &'a str)>, CodecError> {
    let mut lines = payload.lines();
    let header = lines.next().unwrap_or_default();
    if header != expected {
        return Err(CodecError::Header {
            expected,
            found: header.to_string(),
        });
    }
    Ok(lines.enumerate().map(|(i, l)| (i + 2, l)).filter(|(_, l)| !l.is_empty()))
}

pub fn decode_masses(payload: &str) -> Result<Vec<NVec3>, CodecError> {
    body_lines(payload, MASS_HEADER)?
        .map(|(line, text)| parse_vec(text, line))
        .collect()
}

pub fn decode_springs(payload: &str) -> Result<Vec<(NVec3, NVec3)>, CodecError> {
    body_lines(payload, SPRING_HEADER)?
        .map(|(line, text)| {
            let (a, b) = text.split_once(';').ok_or_else(|| CodecError::Line {
                line,
                reason: "missing ';' between endpoints".to_string(),
            })?;
            Ok((parse_vec(a, line)?, parse_vec(b, line)?))
        })
        .collect()
}

/// Whether a request line asks to end the session
///
/// Tokens count as whole words anywhere in the line, with any
/// non-alphanumeric byte as a separator: `quit;` and `mass,exit` match,
/// `exited` does not.
pub fn is_control(request: &str) -> bool {
    request
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| CONTROL_TOKENS.contains(&token))
}

/// Write the decimal length line, then the payload
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    writeln!(writer, "{}", payload.len())?;
    writer.write_all(payload)?;
    writer.flush()
}

/// Read a length line, then exactly that many bytes
pub fn read_frame<R: BufRead>(reader: &mut R) -> Result<Vec<u8>, CodecError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(CodecError::Closed);
    }
    let len_text = line.trim();
    let len: usize = len_text
        .parse()
        .map_err(|_| CodecError::Length(len_text.to_string()))?;
    if len > MAX_FRAME_LEN {
        return Err(CodecError::TooLarge(len));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}
