//! Splits a raw source document into its [`FrontMatter`] and the remaining
//! body. The front-matter block is a YAML mapping fenced by `---` lines:
//!
//! ```md
//! ---
//! title: Hello, world!
//! timestamp: 2018-03-24T12:43:03Z
//! tags: [greet]
//! ---
//! # Hello
//! ```
//!
//! The fence pattern is not anchored to the start of the document; the first
//! `---`…`---` pair found anywhere is the block.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Matches the front-matter block. The first capture group is the YAML
/// (including the opening fence), the second the closing fence.
pub const FRONT_MATTER_PATTERN: &str = r"(?s)(---\s*\n.*?\n?)(---\s*\n?)";

/// Metadata parsed from a document's front-matter block. Every field is
/// optional and zero-valued when absent.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct FrontMatter {
    /// Explicit page title.
    pub title: String,

    /// Summary used for `<meta>` description tags and feed items.
    pub description: String,

    /// Path of a preview image, relative to the site root.
    pub image: String,

    /// An RFC 3339 timestamp. Kept as written; see
    /// [`crate::page::Page::date`] for how it is resolved.
    pub timestamp: String,

    /// Tags in first-seen order with duplicates dropped.
    #[serde(deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,

    /// Author handle, without the leading `@`.
    pub twitter: String,
}

fn deserialize_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<String>>::deserialize(deserializer)?;
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.unwrap_or_default() {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

/// Extracts front matter from one document at a time. Holds the compiled
/// fence pattern so it is built once per run.
pub struct Extractor {
    pattern: Regex,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new()
    }
}

impl Extractor {
    pub fn new() -> Extractor {
        Extractor {
            // The pattern is a constant; failing to compile it is a bug.
            pattern: Regex::new(FRONT_MATTER_PATTERN).unwrap(),
        }
    }

    /// Returns the [`FrontMatter`] parsed from the first block and the body
    /// with every block removed. A document without a block yields the
    /// default front matter and the input unchanged.
    pub fn extract(&self, input: &str) -> Result<(FrontMatter, String)> {
        let front_matter = match self.pattern.captures(input) {
            None => return Ok((FrontMatter::default(), input.to_owned())),
            Some(captures) => parse_yaml(captures.get(1).map_or("", |m| m.as_str()))?,
        };
        Ok((front_matter, self.pattern.replace_all(input, "").into_owned()))
    }
}

fn parse_yaml(yaml: &str) -> Result<FrontMatter> {
    // An empty block (`---\n---`) is valid and carries no metadata, but
    // serde_yaml rejects empty input.
    let content = yaml.trim_start().trim_start_matches("---");
    if content.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Represents the result of a front-matter extraction.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem extracting front matter.
#[derive(Debug)]
pub enum Error {
    /// Returned when the front-matter block is not valid YAML or does not
    /// match the [`FrontMatter`] shape.
    DeserializeYaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DeserializeYaml(err) => write!(f, "parsing front matter: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DeserializeYaml(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
