//! Reading and writing vector tables.
//!
//! A table starts with a `"<words> <dims>"` header. Each entry is a token
//! terminated by whitespace, followed either by `dims` little-endian f32
//! values (binary framing) or by `dims` whitespace-separated decimals (text
//! framing). Binary writers put a newline after each vector; readers skip
//! leading whitespace before a token, so both layouts read back the same.

use crate::error::LoadError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, BufRead, ErrorKind, Write};

/// Word count and feature dimension declared by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub words: usize,
    pub dimension: usize,
}

/// Read the next whitespace-delimited token.
/// - `Ok(Some(bytes))`: a token, its terminating whitespace byte consumed.
/// - `Ok(None)`: clean end of input before any token byte.
pub(crate) fn next_token<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let skip = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
        let found = skip < buf.len();
        reader.consume(skip);
        if found {
            break;
        }
    }

    let mut token = Vec::new();
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        match buf.iter().position(|b| b.is_ascii_whitespace()) {
            Some(end) => {
                token.extend_from_slice(&buf[..end]);
                // Only the single terminator: binary features start right after it.
                reader.consume(end + 1);
                break;
            }
            None => {
                let n = buf.len();
                token.extend_from_slice(buf);
                reader.consume(n);
            }
        }
    }
    Ok(Some(token))
}

/// Streaming reader over a vector table.
pub struct VectorReader<R> {
    inner: R,
    binary: bool,
}

impl<R: BufRead> VectorReader<R> {
    pub fn new(inner: R, binary: bool) -> Self {
        VectorReader { inner, binary }
    }

    pub fn read_header(&mut self) -> Result<Header, LoadError> {
        let words = self.header_field("word count")?;
        let dimension = self.header_field("dimension")?;
        if dimension == 0 {
            return Err(LoadError::MalformedHeader(
                "vectors have zero dimensions".into(),
            ));
        }
        Ok(Header { words, dimension })
    }

    fn header_field(&mut self, name: &str) -> Result<usize, LoadError> {
        let Some(raw) = next_token(&mut self.inner)? else {
            return Err(LoadError::TruncatedInput(format!("header is missing the {name}")));
        };
        let text = String::from_utf8_lossy(&raw);
        text.parse::<usize>()
            .map_err(|_| LoadError::MalformedHeader(format!("{name} '{text}' is not an integer")))
    }

    /// Read one entry: its raw token and `features.len()` values.
    ///
    /// `index` is only used to describe where a truncated table ended.
    pub fn read_entry(&mut self, index: usize, features: &mut [f32]) -> Result<String, LoadError> {
        let Some(raw) = next_token(&mut self.inner)? else {
            return Err(LoadError::TruncatedInput(format!(
                "missing token for vector {index}"
            )));
        };
        let token = String::from_utf8_lossy(&raw).into_owned();

        if self.binary {
            match self.inner.read_f32_into::<LittleEndian>(features) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(LoadError::TruncatedInput(format!(
                        "vector {index} ('{token}') has fewer than {} features",
                        features.len()
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            for slot in features.iter_mut() {
                let Some(raw) = next_token(&mut self.inner)? else {
                    return Err(LoadError::TruncatedInput(format!(
                        "vector {index} ('{token}') has fewer than {} features",
                        features.len()
                    )));
                };
                let text = String::from_utf8_lossy(&raw);
                *slot = text.parse::<f32>().map_err(|_| LoadError::InvalidFeature {
                    token: token.clone(),
                    value: text.to_string(),
                })?;
            }
        }

        Ok(token)
    }
}

/// Writes vector tables in either framing.
pub struct VectorWriter<W> {
    inner: W,
    binary: bool,
}

impl<W: Write> VectorWriter<W> {
    pub fn new(inner: W, binary: bool) -> Self {
        VectorWriter { inner, binary }
    }

    pub fn write_header(&mut self, header: Header) -> io::Result<()> {
        writeln!(self.inner, "{} {}", header.words, header.dimension)
    }

    pub fn write_entry(&mut self, token: &str, features: &[f32]) -> io::Result<()> {
        write!(self.inner, "{token}")?;
        if self.binary {
            self.inner.write_u8(b' ')?;
            for &value in features {
                self.inner.write_f32::<LittleEndian>(value)?;
            }
        } else {
            for value in features {
                write!(self.inner, " {value}")?;
            }
        }
        writeln!(self.inner)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
