//! Finds and reads the markdown documents a site is built from.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub const MARKDOWN_EXTENSION: &str = "md";

/// A source file, read once.
#[derive(Clone, Debug)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub contents: Vec<u8>,
}

impl SourceDocument {
    /// Reads the file at `path`.
    pub fn read(path: &Path) -> Result<SourceDocument> {
        let annotate = |err| Error::Read {
            path: path.to_owned(),
            err,
        };
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(annotate)?;
        let contents = std::fs::read(path).map_err(annotate)?;
        Ok(SourceDocument {
            path: path.to_owned(),
            modified,
            contents,
        })
    }
}

/// Returns the documents for `source`. A file is taken as the sole document
/// whatever its extension; in a directory only the immediate `.md` files are,
/// in file-name order.
pub fn discover(source: &Path) -> Result<Vec<SourceDocument>> {
    let metadata = std::fs::metadata(source).map_err(|err| Error::Read {
        path: source.to_owned(),
        err,
    })?;
    if !metadata.is_dir() {
        return Ok(vec![SourceDocument::read(source)?]);
    }

    let mut documents = Vec::new();
    for result in WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = result?;
        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
        {
            documents.push(SourceDocument::read(entry.path())?);
        }
    }
    Ok(documents)
}

/// Represents the result of reading source documents.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem reading source documents.
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file or directory can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => write!(f, "Reading '{}': {}", path.display(), err),
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the source directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
