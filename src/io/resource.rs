use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DEFAULT_CHUNK: usize = 4096;

/// A readable, closable stream of bytes.
pub trait ByteSource: Send {
    /// Next chunk of bytes, or `None` at end of stream.
    fn read_chunk(&mut self) -> Result<Option<Vec<u8>>>;

    /// Release the underlying handle. Called once; later reads may fail.
    fn close(&mut self) -> Result<()>;
}

/// [`ByteSource`] over any reader, read in fixed-size chunks.
pub struct ReaderSource<R> {
    reader: Option<R>,
    chunk_size: usize,
    label: String,
}

impl<R: Read + Send> ReaderSource<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader: Some(reader),
            chunk_size: DEFAULT_CHUNK,
            label: label.into(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl<R: Read + Send> ByteSource for ReaderSource<R> {
    fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(Error::resource(format!("{} is closed", self.label), None));
        };
        let mut buf = vec![0u8; self.chunk_size];
        let n = reader
            .read(&mut buf)
            .map_err(|e| Error::resource(format!("read {}", self.label), Some(e)))?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    fn close(&mut self) -> Result<()> {
        if self.reader.take().is_some() {
            debug!("closed {}", self.label);
        }
        Ok(())
    }
}

/// Open a file for chunked reading.
pub fn open_file(path: impl AsRef<Path>) -> Result<ReaderSource<File>> {
    let path = path.as_ref();
    let f = File::open(path)
        .map_err(|e| Error::resource(format!("open {}", path.display()), Some(e)))?;
    debug!("opened {}", path.display());
    Ok(ReaderSource::new(f, path.display().to_string()))
}

/// Lazily decodes a [`ByteSource`] into UTF-8 characters.
///
/// Only as many chunks as needed for the next character are read. The source
/// is closed when the stream ends, when a read fails, or when the decoder is
/// dropped early. The first error ends the stream.
pub struct Utf8Chars {
    source: Option<Box<dyn ByteSource>>,
    buf: Vec<u8>,
    pos: usize,
    failed: bool,
}

impl Utf8Chars {
    pub fn new(source: Box<dyn ByteSource>) -> Self {
        Self {
            source: Some(source),
            buf: Vec::new(),
            pos: 0,
            failed: false,
        }
    }

    /// Make sure at least `n` unread bytes are buffered. `Ok(false)` at EOF.
    fn fill(&mut self, n: usize) -> Result<bool> {
        while self.buf.len() - self.pos < n {
            let Some(source) = self.source.as_mut() else {
                return Ok(false);
            };
            match source.read_chunk()? {
                Some(chunk) => {
                    self.buf.drain(..self.pos);
                    self.pos = 0;
                    self.buf.extend_from_slice(&chunk);
                }
                None => {
                    self.release();
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take()
            && let Err(e) = source.close()
        {
            warn!("failed to close byte source: {e}");
        }
    }

    fn decode_next(&mut self) -> Result<Option<char>> {
        if !self.fill(1)? {
            return Ok(None);
        }
        let width = utf8_width(self.buf[self.pos]);
        if width == 0 || !self.fill(width)? {
            return Err(Error::resource("invalid UTF-8 in byte stream", None));
        }
        let bytes = &self.buf[self.pos..self.pos + width];
        let c = std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or_else(|| Error::resource("invalid UTF-8 in byte stream", None))?;
        self.pos += width;
        Ok(Some(c))
    }
}

impl Iterator for Utf8Chars {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.decode_next() {
            Ok(Some(c)) => Some(Ok(c)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                self.buf.clear();
                self.pos = 0;
                self.release();
                Some(Err(e))
            }
        }
    }
}

impl Drop for Utf8Chars {
    fn drop(&mut self) {
        self.release();
    }
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_multibyte_chars_across_chunk_boundaries() -> anyhow::Result<()> {
        let src = ReaderSource::new(Cursor::new("héllo→".as_bytes().to_vec()), "mem").with_chunk_size(1);
        let chars: Vec<char> = Utf8Chars::new(Box::new(src)).collect::<Result<_>>()?;
        assert_eq!(chars.into_iter().collect::<String>(), "héllo→");
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_a_resource_error() {
        let src = ReaderSource::new(Cursor::new(vec![0xFFu8, b'a']), "mem");
        let mut chars = Utf8Chars::new(Box::new(src));
        assert!(matches!(chars.next(), Some(Err(Error::Resource { .. }))));
        assert!(chars.next().is_none());
        assert!(chars.next().is_none());
    }

    #[test]
    fn truncated_multibyte_char_ends_the_stream() {
        let src = ReaderSource::new(Cursor::new(vec![b'a', 0xE2, 0x86]), "mem").with_chunk_size(1);
        let mut chars = Utf8Chars::new(Box::new(src));
        assert!(matches!(chars.next(), Some(Ok('a'))));
        assert!(matches!(chars.next(), Some(Err(Error::Resource { .. }))));
        assert!(chars.next().is_none());
    }

    #[test]
    fn missing_file_fails_to_open() {
        let err = open_file("/definitely/not/here.txt").err();
        assert!(matches!(err, Some(Error::Resource { .. })));
    }
}
