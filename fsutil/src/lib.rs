use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("Invalid glob pattern '{0}': {1}")]
        InvalidGlob(String, #[source] ::glob::PatternError),
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

/// Read line by line and join the lines with `\n`.
///
/// Line terminators are normalized (`\r\n` becomes `\n`) and the newline
/// after the last line is dropped. Bytes are passed through unchanged, valid UTF-8 or not.
/// ```
/// # use std::io::Cursor;
/// assert_eq!(fsutil::join_lines(Cursor::new("3\n")).unwrap(), b"3");
/// assert_eq!(fsutil::join_lines(Cursor::new("a\r\nb\n\n")).unwrap(), b"a\nb\n");
/// assert_eq!(fsutil::join_lines(Cursor::new(b"caf\xe9\n")).unwrap(), b"caf\xe9");
/// assert_eq!(fsutil::join_lines(Cursor::new("")).unwrap(), b"");
/// ```
pub fn join_lines(reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut content = Vec::new();
    for line in BufReader::new(reader).split(b'\n') {
        let line = line?;
        content.extend_from_slice(line.strip_suffix(b"\r").unwrap_or(&line));
        content.push(b'\n');
    }
    content.pop();
    Ok(content)
}

/// Same as [`join_lines`], reading from a file.
#[must_use]
pub fn read_lines(filepath: impl AsRef<Path>) -> Result<Vec<u8>> {
    let filepath = filepath.as_ref();
    let f = File::open(filepath)
        .map_err(|e| Error::SingleIO("Cannot open file", filepath.to_owned(), e))?;
    join_lines(f).map_err(|e| Error::SingleIO("Cannot read file", filepath.to_owned(), e))
}

/// Expand a glob pattern into the matched paths, in the order the glob crate yields them.
/// Entries that cannot be read are skipped.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths =
        ::glob::glob(pattern).map_err(|e| Error::InvalidGlob(pattern.to_owned(), e))?;
    let mut res = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => res.push(path),
            Err(e) => log::warn!("Skipping unreadable path {:?}: {}", e.path(), e.error()),
        }
    }
    Ok(res)
}
