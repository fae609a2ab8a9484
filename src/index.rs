//! Orders pages and builds the site-wide index page.

use crate::config::Config;
use crate::page::Page;
use pulldown_cmark::escape::{escape_href, escape_html};

/// Where the index page is written, relative to the output directory.
pub const INDEX_PATH: &str = "index.html";

/// Sorts pages newest first. Pages with equal dates keep no particular
/// relative order.
pub fn sort_pages(pages: &mut [Page]) {
    pages.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// Builds the index page listing every page in `pages`, which should already
/// be sorted.
pub fn index_page<'a>(config: &'a Config, pages: &'a [Page<'a>]) -> Page<'a> {
    Page::aggregate(config, INDEX_PATH.to_owned(), pages.iter().collect())
}

/// Renders the link list for an aggregate page: one item per child with its
/// title, date, and tags.
pub fn render_links(children: &[&Page]) -> Result<String, url::ParseError> {
    let mut out = String::from("<ul>\n");
    for child in children {
        let date = child.date().format("%Y-%m-%d").to_string();
        out.push_str("  <li>");
        push_link(&mut out, &child.url()?, child.title());
        out.push_str(&format!(
            r#" <time datetime="{}">{}</time>"#,
            date, date
        ));
        let mut tags = child.tags().iter().peekable();
        if tags.peek().is_some() {
            out.push_str(r#" <span class="tags">"#);
            for tag in tags {
                out.push(' ');
                push_link(&mut out, &child.config.resolve_url(&tag.relative_path())?, &tag.name);
            }
            out.push_str("</span>");
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
    Ok(out)
}

fn push_link(out: &mut String, href: &str, text: &str) {
    // Writing into a String can't fail.
    out.push_str(r#"<a href=""#);
    let _ = escape_href(&mut *out, href);
    out.push_str(r#"">"#);
    let _ = escape_html(&mut *out, text);
    out.push_str("</a>");
}
