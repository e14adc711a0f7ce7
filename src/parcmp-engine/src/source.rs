use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::SourceError;

#[cfg(unix)]
fn read_at(file: &fs::File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &fs::File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

/// A read-only, random-access view over one comparison input.
///
/// Every read is positioned explicitly by its offset and never moves
/// a shared cursor, so one source may be read from many threads at
/// the same time.
#[derive(Debug)]
pub struct BlockSource {
    path: PathBuf,
    file: fs::File,
    len: u64,
}

impl BlockSource {
    /// Opens the file at `path` for reading.
    ///
    /// The length of the input is captured once here and assumed to
    /// stay unchanged for the lifetime of the source.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) => return Err(SourceError::from_open(path, e)),
        };
        let len = match file.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => return Err(SourceError::from_open(path, e)),
        };

        Ok(Self { path, file, len })
    }

    /// The path this source was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The total length of the input in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the input has no contents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads up to `len` bytes starting at `offset` into `buf`.
    ///
    /// `buf` is cleared and resized for the read. The returned slice
    /// is shorter than `len` only when the input ends early, which
    /// callers observe as a difference in available length.
    pub fn read_block<'b>(
        &self,
        offset: u64,
        len: usize,
        buf: &'b mut Vec<u8>,
    ) -> Result<&'b [u8], SourceError> {
        buf.clear();
        buf.resize(len, 0);

        let mut filled = 0;
        while filled < len {
            match read_at(&self.file, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(SourceError::Read {
                        offset,
                        len,
                        source,
                    });
                }
            }
        }

        buf.truncate(filled);
        Ok(&buf[..])
    }
}
