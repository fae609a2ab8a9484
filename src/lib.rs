//! The library code for the `scrivener` static site generator. A build runs
//! in two distinct steps:
//!
//! 1. Loading pages from source documents on disk ([`crate::page`])
//! 2. Converting the pages into output files on disk ([`crate::write`])
//!
//! Loading a page is itself composed of two sub-steps: splitting the front
//! matter from the body ([`crate::frontmatter`]) and rendering the body
//! ([`crate::render`]), which executes it as a template before converting the
//! markdown to HTML.
//!
//! Once every page is loaded, the pages are sorted newest first and the
//! derived outputs are built from the same in-memory set: the index page
//! ([`crate::index`]), one page per tag ([`crate::tag`]), and the RSS feed
//! ([`crate::feed`]). [`crate::build`] stitches the steps together.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod assets;
pub mod build;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod index;
pub mod page;
pub mod render;
pub mod source;
pub mod tag;
pub mod write;
