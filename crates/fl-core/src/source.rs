//! Text sources and the scoped file handle.
//!
//! Parsers never assume a concrete file type. They read through
//! [`TextSource`], which offers bounded chunk reads, line reads and a rewind
//! to offset 0 for multi-pass parsing. [`FileHandle`] owns a source for the
//! lifetime of a parser: the file is opened when the handle is created and
//! closed when it is dropped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::FlResult;

/// Capability required by every parser.
pub trait TextSource {
    /// Read at most roughly `max_bytes` of text. An empty string means end of
    /// stream. A multi-byte character cut by the limit is carried over to the
    /// next call instead of being split.
    fn read_chunk(&mut self, max_bytes: usize) -> io::Result<String>;

    /// Append the next line (including its terminator) to `buf`; returns the
    /// number of bytes read, 0 at end of stream.
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;

    /// Seek back to offset 0.
    fn rewind(&mut self) -> io::Result<()>;

    /// Read everything from the current position.
    fn read_remaining(&mut self) -> io::Result<String> {
        let mut text = String::new();
        loop {
            let chunk = self.read_chunk(64 * 1024)?;
            if chunk.is_empty() {
                return Ok(text);
            }
            text.push_str(&chunk);
        }
    }
}

/// [`TextSource`] over any buffered, seekable reader.
pub struct ReaderSource<R> {
    reader: R,
    pending: Vec<u8>,
}

pub type FileSource = ReaderSource<BufReader<File>>;
pub type StringSource = ReaderSource<Cursor<Vec<u8>>>;

impl<R> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
        }
    }
}

impl FileSource {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl StringSource {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Cursor::new(text.into().into_bytes()))
    }
}

impl<R: BufRead + Seek> TextSource for ReaderSource<R> {
    fn read_chunk(&mut self, max_bytes: usize) -> io::Result<String> {
        let mut bytes = std::mem::take(&mut self.pending);
        loop {
            let read = self
                .reader
                .by_ref()
                .take(max_bytes.max(1) as u64)
                .read_to_end(&mut bytes)?;
            match String::from_utf8(bytes) {
                Ok(text) => return Ok(text),
                Err(err) => {
                    let utf8 = err.utf8_error();
                    let mut raw = err.into_bytes();
                    if utf8.error_len().is_none() && read > 0 {
                        // incomplete trailing character: finish it on the next read
                        let tail = raw.split_off(utf8.valid_up_to());
                        if raw.is_empty() {
                            bytes = tail;
                            continue;
                        }
                        self.pending = tail;
                    }
                    return Ok(String::from_utf8_lossy(&raw).into_owned());
                }
            }
        }
    }

    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        let mut bytes = std::mem::take(&mut self.pending);
        let carried = bytes.len();
        let read = self.reader.read_until(b'\n', &mut bytes)?;
        if carried + read == 0 {
            return Ok(0);
        }
        buf.push_str(&String::from_utf8_lossy(&bytes));
        Ok(carried + read)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.pending.clear();
        self.reader.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

/// Scoped owner of a text source.
pub struct FileHandle<S = FileSource> {
    path: Option<PathBuf>,
    source: S,
    line_count: Option<usize>,
}

impl FileHandle<FileSource> {
    /// Open `path` for reading. The file stays open until the handle drops.
    pub fn open(path: impl AsRef<Path>) -> FlResult<Self> {
        let path = path.as_ref();
        let source = FileSource::open(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            source,
            line_count: None,
        })
    }
}

impl FileHandle<StringSource> {
    /// In-memory handle, mostly for tests and piped input.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_source(StringSource::from_text(text))
    }
}

impl<S: TextSource> FileHandle<S> {
    pub fn from_source(source: S) -> Self {
        Self {
            path: None,
            source,
            line_count: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Path for messages; `<memory>` for in-memory sources.
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }

    pub fn rewind(&mut self) -> FlResult<()> {
        self.source.rewind()?;
        Ok(())
    }

    /// Rewind and hand out the source for a fresh pass.
    pub fn rewound(&mut self) -> FlResult<&mut S> {
        self.source.rewind()?;
        Ok(&mut self.source)
    }

    /// Whole contents from offset 0.
    pub fn read_all(&mut self) -> FlResult<String> {
        let text = self.rewound()?.read_remaining()?;
        self.source.rewind()?;
        Ok(text)
    }

    /// Every line from offset 0, without terminators.
    pub fn lines(&mut self) -> FlResult<Vec<String>> {
        let source = self.rewound()?;
        let mut lines = Vec::new();
        let mut buf = String::new();
        loop {
            buf.clear();
            if source.read_line(&mut buf)? == 0 {
                break;
            }
            lines.push(buf.trim_end_matches(['\n', '\r']).to_string());
        }
        self.source.rewind()?;
        self.line_count = Some(lines.len());
        Ok(lines)
    }

    /// Number of lines in the file. Requires a full pass the first time it
    /// is called; the source is rewound afterwards.
    pub fn line_count(&mut self) -> FlResult<usize> {
        if let Some(n) = self.line_count {
            return Ok(n);
        }
        let source = self.rewound()?;
        let mut n = 0;
        let mut buf = String::new();
        loop {
            buf.clear();
            if source.read_line(&mut buf)? == 0 {
                break;
            }
            n += 1;
        }
        self.source.rewind()?;
        self.line_count = Some(n);
        Ok(n)
    }
}
