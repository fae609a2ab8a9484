//! Defines [`Page`], the unit that gets rendered into one output file, and
//! the logic for loading a content page from a [`SourceDocument`].
//!
//! A content page moves through `unloaded → front-matter-extracted →
//! content-rendered → written`; [`Page::load`] covers the first three steps
//! and [`crate::write::Writer`] the last. Aggregate pages (the index and tag
//! pages) are built directly in the rendered state by [`Page::aggregate`].

use crate::config::Config;
use crate::frontmatter::{self, Extractor, FrontMatter};
use crate::render::{self, BodyContext};
use crate::source::SourceDocument;
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

pub const HTML_EXTENSION: &str = "html";

/// A tag on a page. `name` is shown to readers; `slug` names the tag's page
/// and is unique per name across a site once
/// [`crate::tag::assign_slugs`] has run.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str) -> Tag {
        Tag {
            name: name.to_owned(),
            slug: slug::slugify(name),
        }
    }

    /// The tag page's path relative to the output directory.
    pub fn relative_path(&self) -> String {
        format!("tag/{}.{}", self.slug, HTML_EXTENSION)
    }
}

/// A rendered page awaiting its layout.
#[derive(Debug)]
pub struct Page<'a> {
    pub front_matter: FrontMatter,

    /// Rendered HTML body. Empty for aggregate pages.
    pub content: String,

    /// Output path relative to the output directory, e.g. `post.html` or
    /// `tag/rust.html`.
    pub relative_path: String,

    /// File name without extension. Fixed at construction.
    pub slug: String,

    /// The resolved date; see [`Page::date`].
    date: DateTime<FixedOffset>,

    /// The front-matter tags in order.
    pub tags: Vec<Tag>,

    /// The layout template this page is rendered with.
    pub layout: &'a Path,

    /// The pages listed by an aggregate page, newest first. Empty for content
    /// pages.
    pub children: Vec<&'a Page<'a>>,

    pub config: &'a Config,
}

impl<'a> Page<'a> {
    /// Loads a content page: extracts the front matter, resolves the date,
    /// and renders the body.
    pub fn load(
        config: &'a Config,
        extractor: &Extractor,
        document: &SourceDocument,
    ) -> Result<Page<'a>> {
        let slug = file_stem(&document.path)
            .ok_or_else(|| Error::InvalidFileName(document.path.clone()))?;
        let contents = std::str::from_utf8(&document.contents)?;
        let (front_matter, body) = extractor.extract(contents)?;
        let date = resolve_date(&front_matter.timestamp, Some(document.modified), &slug);

        let tags = front_matter.tags.iter().map(|name| Tag::new(name)).collect();
        let mut page = Page {
            front_matter,
            tags,
            content: String::new(),
            relative_path: format!("{}.{}", slug, HTML_EXTENSION),
            slug,
            date,
            layout: &config.layouts.page,
            children: Vec::new(),
            config,
        };
        let content = render::render(
            &body,
            &BodyContext {
                title: page.title(),
                slug: &page.slug,
            },
        )?;
        page.content = content;
        Ok(page)
    }

    /// Builds a page with no source document, written to `relative_path`
    /// with the index layout. Its title is the site title and its date is the
    /// current time.
    pub fn aggregate(
        config: &'a Config,
        relative_path: String,
        children: Vec<&'a Page<'a>>,
    ) -> Page<'a> {
        let slug = file_stem(Path::new(&relative_path)).unwrap_or_default();
        Page {
            front_matter: FrontMatter {
                title: config.site.title.clone(),
                ..FrontMatter::default()
            },
            content: String::new(),
            relative_path,
            slug,
            tags: Vec::new(),
            date: Utc::now().into(),
            layout: &config.layouts.index,
            children,
            config,
        }
    }

    /// The front-matter title, or the slug when there is none.
    pub fn title(&self) -> &str {
        non_empty(&self.front_matter.title).unwrap_or(&self.slug)
    }

    /// The front-matter description, falling back to the site description.
    pub fn description(&self) -> &str {
        non_empty(&self.front_matter.description).unwrap_or(&self.config.site.description)
    }

    /// The front-matter image, falling back to the site image. Relative to
    /// the site root.
    pub fn image(&self) -> &str {
        non_empty(&self.front_matter.image).unwrap_or(&self.config.site.image)
    }

    /// The front-matter handle, falling back to the site handle.
    pub fn twitter(&self) -> &str {
        non_empty(&self.front_matter.twitter).unwrap_or(&self.config.site.twitter)
    }

    /// The front-matter timestamp when it parses as RFC 3339, otherwise the
    /// source file's modification time. Aggregate pages use the time they
    /// were built.
    pub fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The absolute output path.
    pub fn destination(&self) -> PathBuf {
        self.config.output.join(&self.relative_path)
    }

    /// The canonical link to the page.
    pub fn url(&self) -> std::result::Result<String, url::ParseError> {
        self.config.resolve_url(&self.relative_path)
    }

    /// The relative prefix from this page's directory to the site root.
    pub fn root(&self) -> String {
        "../".repeat(self.relative_path.matches('/').count())
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()?.to_str().map(str::to_owned)
}

fn resolve_date(
    timestamp: &str,
    modified: Option<std::time::SystemTime>,
    slug: &str,
) -> DateTime<FixedOffset> {
    if !timestamp.is_empty() {
        match DateTime::parse_from_rfc3339(timestamp) {
            Ok(date) => return date,
            Err(err) => log::warn!(
                "{}: ignoring timestamp `{}`: {}",
                slug,
                timestamp,
                err
            ),
        }
    }
    match modified {
        Some(modified) => DateTime::<Utc>::from(modified).into(),
        None => Utc::now().into(),
    }
}

/// Represents the result of loading a [`Page`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading a [`Page`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the file name has no usable stem.
    InvalidFileName(PathBuf),

    /// Returned when a source file isn't valid UTF-8.
    Utf8(std::str::Utf8Error),

    /// Returned when the front matter can't be parsed.
    FrontMatter(frontmatter::Error),

    /// Returned when the body can't be rendered.
    Render(render::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidFileName(path) => write!(f, "invalid file name: {:?}", path),
            Error::Utf8(err) => err.fmt(f),
            Error::FrontMatter(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidFileName(_) => None,
            Error::Utf8(err) => Some(err),
            Error::FrontMatter(err) => Some(err),
            Error::Render(err) => Some(err),
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Error {
        Error::Utf8(err)
    }
}

impl From<frontmatter::Error> for Error {
    fn from(err: frontmatter::Error) -> Error {
        Error::FrontMatter(err)
    }
}

impl From<render::Error> for Error {
    fn from(err: render::Error) -> Error {
        Error::Render(err)
    }
}
