//! Support for creating RSS feeds from a list of pages.

use crate::config::Config;
use crate::page::Page;
use rss::{Channel, ChannelBuilder, Item, ItemBuilder};
use std::fmt;
use std::io::Write;

/// Where the feed is written, relative to the output directory.
pub const FEED_PATH: &str = "index.rss";

/// Creates a feed from the site configuration and a list of [`Page`]s and
/// writes the result to a [`std::io::Write`]. Items follow the order of
/// `pages`.
pub fn write_feed<W: Write>(config: &Config, pages: &[Page], w: W) -> Result<W> {
    Ok(feed(config, pages)?.write_to(w)?)
}

/// Builds the channel. The channel link is the site root.
pub fn feed(config: &Config, pages: &[Page]) -> Result<Channel> {
    let author = author(config);
    Ok(ChannelBuilder::default()
        .title(config.site.title.as_str())
        .link(config.resolve_url("")?)
        .description(config.site.description.as_str())
        .managing_editor(author.clone())
        .items(feed_items(pages, author.as_deref())?)
        .build())
}

fn feed_items(pages: &[Page], author: Option<&str>) -> Result<Vec<Item>> {
    let mut items: Vec<Item> = Vec::with_capacity(pages.len());
    for page in pages {
        let description = match page.front_matter.description.as_str() {
            "" => page.title(),
            description => description,
        };
        items.push(
            ItemBuilder::default()
                .title(page.title().to_owned())
                .link(page.url()?)
                .description(description.to_owned())
                .author(author.map(str::to_owned))
                .pub_date(page.date().to_rfc2822())
                .build(),
        );
    }
    Ok(items)
}

/// Formats the site author the way RSS expects: `email (Name)`, or just the
/// email. RSS has no field for a bare name.
fn author(config: &Config) -> Option<String> {
    let site = &config.site;
    match (site.email.is_empty(), site.name.is_empty()) {
        (true, _) => None,
        (false, true) => Some(site.email.clone()),
        (false, false) => Some(format!("{} ({})", site.email, site.name)),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include RSS serialization
/// and link resolution issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when the feed can't be serialized or written.
    Rss(rss::Error),

    /// Returned when a page link can't be joined onto the site URL.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Rss(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Rss(err) => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<rss::Error> for Error {
    /// Converts [`rss::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: rss::Error) -> Error {
        Error::Rss(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use
    /// the `?` operator when resolving links.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
