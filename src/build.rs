//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: discovering the source
//! documents ([`crate::source`]), copying assets ([`crate::assets`]), loading
//! and rendering pages ([`crate::page`]), writing them through their layouts
//! ([`crate::write`]), and generating the index, tag pages, and RSS feed.

use crate::assets::{self, Error as AssetsError};
use crate::config::Config;
use crate::feed::{self, Error as FeedError, FEED_PATH};
use crate::frontmatter::Extractor;
use crate::index;
use crate::page::{Error as LoadError, Page};
use crate::source::{self, Error as SourceError, SourceDocument};
use crate::tag::{self, TagIndex};
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Builds the site from a [`Config`] object: creates the output directory,
/// copies the configured assets, discovers the source documents, and hands
/// them to [`generate`] which does the heavy-lifting.
pub fn build_site(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.output).map_err(|err| Error::Io {
        path: config.output.clone(),
        err,
    })?;
    assets::copy_assets(config)?;
    let documents = source::discover(&config.source)?;
    log::debug!(
        "found {} documents in {}",
        documents.len(),
        config.source.display()
    );
    generate(config, &documents)
}

/// Runs the page pipeline over already-discovered documents. Every page is
/// loaded and rendered before anything is written; then pages are sorted
/// newest first and written, followed by the index, one page per tag, and the
/// feed. The first error aborts the run.
pub fn generate(config: &Config, documents: &[SourceDocument]) -> Result<()> {
    let extractor = Extractor::new();
    let mut pages: Vec<Page> = Vec::with_capacity(documents.len());
    for document in documents {
        let page = Page::load(config, &extractor, document).map_err(|err| Error::Load {
            path: document.path.clone(),
            err,
        })?;
        log::debug!("loaded {} as {}", document.path.display(), page.slug);
        pages.push(page);
    }
    // Before sorting, so tag file names follow discovery order.
    tag::assign_slugs(&mut pages);
    index::sort_pages(&mut pages);
    if let (Some(newest), Some(oldest)) = (pages.first(), pages.last()) {
        log::debug!("sorted {} pages, newest {} oldest {}", pages.len(), newest.slug, oldest.slug);
    }

    let writer = Writer;
    for page in &pages {
        write_page(&writer, page)?;
    }

    write_page(&writer, &index::index_page(config, &pages))?;

    let tags = TagIndex::build(&pages);
    for page in tags.tag_pages(config) {
        write_page(&writer, &page)?;
    }

    let path = config.output.join(FEED_PATH);
    let file = File::create(&path).map_err(|err| Error::Io {
        path: path.clone(),
        err,
    })?;
    feed::write_feed(config, &pages, BufWriter::new(file))?
        .flush()
        .map_err(|err| Error::Io {
            path: path.clone(),
            err,
        })?;
    log::info!("Wrote: {}", path.display());
    Ok(())
}

fn write_page(writer: &Writer, page: &Page) -> Result<()> {
    let path = writer.write_page(page).map_err(|err| Error::Write {
        path: page.destination(),
        err,
    })?;
    log::info!("Wrote: {}", path.display());
    Ok(())
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during discovery, asset
/// copying, loading, writing, feed generation, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors discovering or reading source documents.
    Source(SourceError),

    /// Returned for errors copying assets into the output directory.
    Assets(AssetsError),

    /// Returned when a source document can't be loaded and rendered.
    Load { path: PathBuf, err: LoadError },

    /// Returned for errors writing a [`Page`] to disk as an HTML file.
    Write { path: PathBuf, err: WriteError },

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Source(err) => err.fmt(f),
            Error::Assets(err) => err.fmt(f),
            Error::Load { path, err } => write!(f, "Loading '{}': {}", path.display(), err),
            Error::Write { path, err } => write!(f, "Generating '{}': {}", path.display(), err),
            Error::Feed(err) => write!(f, "Writing feed: {}", err),
            Error::Io { path, err } => write!(f, "'{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source(err) => Some(err),
            Error::Assets(err) => Some(err),
            Error::Load { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::Feed(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<SourceError> for Error {
    /// Converts [`SourceError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: SourceError) -> Error {
        Error::Source(err)
    }
}

impl From<AssetsError> for Error {
    /// Converts [`AssetsError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: AssetsError) -> Error {
        Error::Assets(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}
