//! Copies configured stylesheets and images into the output tree.

use crate::config::Config;
use std::fmt;
use std::path::{Path, PathBuf};

/// Copies `{project}/assets/css/*` to `{output}/css/` and
/// `{project}/assets/images/*` to `{output}/images/` for every configured
/// asset. Does nothing when no assets are configured.
pub fn copy_assets(config: &Config) -> Result<()> {
    let assets = match &config.assets {
        Some(assets) => assets,
        None => return Ok(()),
    };
    let source = config.project_directory.join("assets");
    copy_files(&assets.css, &source.join("css"), &config.output.join("css"))?;
    copy_files(
        &assets.images,
        &source.join("images"),
        &config.output.join("images"),
    )
}

fn copy_files(files: &[String], src: &Path, dst: &Path) -> Result<()> {
    if files.is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dst).map_err(|err| Error {
        path: dst.to_owned(),
        err,
    })?;
    for file in files {
        std::fs::copy(src.join(file), dst.join(file)).map_err(|err| Error {
            path: src.join(file),
            err,
        })?;
        log::debug!("Copied asset: {}", dst.join(file).display());
    }
    Ok(())
}

pub type Result<T> = std::result::Result<T, Error>;

/// Returned when an asset can't be copied.
#[derive(Debug)]
pub struct Error {
    pub path: PathBuf,
    pub err: std::io::Error,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Copying asset '{}': {}", self.path.display(), self.err)
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}
