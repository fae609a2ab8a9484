//! Applies layout templates to [`Page`]s and writes the results to disk.
//!
//! A layout is executed against the value built by [`layout_value`]. Besides
//! the page fields, every layout can use the `assets` sub-template, which
//! emits one stylesheet `<link>` per configured asset, and the `has`
//! predicate, which tests whether a field of a value is present and
//! non-empty:
//!
//! ```html
//! <head>
//! {{ .Headers }}
//! {{ if has . "Assets" }}{{ template "assets" . }}{{ end }}
//! </head>
//! <body>{{ .Content }}</body>
//! ```

use crate::index;
use crate::page::Page;
use crate::render;
use gtmpl::{Context, Template};
use gtmpl_value::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Defines the `assets` sub-template, appended to every layout.
pub const ASSETS_TEMPLATE: &str = r#"{{ define "assets" }}
  {{ range .Assets }}
    <link type="text/css" rel="stylesheet" href="{{ . }}">
  {{ end }}
{{ end }}"#;

/// Responsible for templating and writing HTML pages to disk.
#[derive(Default)]
pub struct Writer;

impl Writer {
    /// Takes a single [`Page`], templates it with its layout, and writes it
    /// to [`Page::destination`]. The file is created before the layout is
    /// read, so a failure can leave it empty or partial.
    pub fn write_page(&self, page: &Page) -> Result<PathBuf> {
        let destination = page.destination();
        if let Some(dir) = destination.parent() {
            std::fs::create_dir_all(dir).map_err(|err| Error::Io {
                path: dir.to_owned(),
                err,
            })?;
        }
        let file = File::create(&destination).map_err(|err| Error::Io {
            path: destination.clone(),
            err,
        })?;
        let mut w = BufWriter::new(file);

        let template = parse_layout(page.layout)?;
        let context = Context::from(layout_value(page)?).map_err(Error::ExecuteTemplate)?;
        template
            .execute(&mut w, &context)
            .map_err(Error::ExecuteTemplate)?;
        w.flush().map_err(|err| Error::Io {
            path: destination.clone(),
            err,
        })?;
        Ok(destination)
    }
}

/// Loads the layout file, appends [`ASSETS_TEMPLATE`], and parses the result
/// into a template with the `has` predicate registered.
pub fn parse_layout(path: &Path) -> Result<Template> {
    let mut contents = std::fs::read_to_string(path).map_err(|err| Error::OpenLayout {
        path: path.to_owned(),
        err,
    })?;
    let parse_error = |err| Error::ParseLayout {
        path: path.to_owned(),
        err,
    };
    render::check_actions(&contents).map_err(parse_error)?;
    contents.push_str(ASSETS_TEMPLATE);

    let mut template = Template::default();
    template.add_func("has", has);
    template.parse(&contents).map_err(parse_error)?;
    Ok(template)
}

/// `{{ has . "Field" }}`: true when the value has `Field` and it is neither
/// nil, false, nor empty.
fn has(args: &[Value]) -> std::result::Result<Value, String> {
    match args {
        [Value::Object(fields), Value::String(name)] => {
            Ok(Value::Bool(fields.get(name).map_or(false, is_present)))
        }
        [_, Value::String(_)] => Ok(Value::Bool(false)),
        _ => Err(String::from("has requires a value and a field name")),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

/// Converts a [`Page`] into the value its layout is executed against.
pub fn layout_value(page: &Page) -> Result<Value> {
    let config = page.config;
    let root = page.root();
    let stylesheets: Vec<Value> = config
        .stylesheets()
        .iter()
        .map(|css| Value::String(format!("{}css/{}", root, css)))
        .collect();

    let mut children: Vec<Value> = Vec::with_capacity(page.children.len());
    for child in &page.children {
        children.push(summary_value(child)?);
    }

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("Title".to_owned(), string(page.title()));
    m.insert("Slug".to_owned(), string(&page.slug));
    m.insert("URL".to_owned(), Value::String(page.url()?));
    m.insert("Date".to_owned(), Value::String(date(page)));
    m.insert("Description".to_owned(), string(page.description()));
    m.insert("Image".to_owned(), string(page.image()));
    m.insert("Twitter".to_owned(), string(page.twitter()));
    m.insert("Tags".to_owned(), tags_value(page)?);
    m.insert("Content".to_owned(), string(&page.content));
    m.insert("Headers".to_owned(), Value::String(headers(page)?));
    m.insert(
        "Index".to_owned(),
        Value::String(match page.children.is_empty() {
            true => String::new(),
            false => index::render_links(&page.children)?,
        }),
    );
    m.insert("Children".to_owned(), Value::Array(children));
    m.insert("HasAssets".to_owned(), Value::Bool(!stylesheets.is_empty()));
    m.insert(
        "Assets".to_owned(),
        match stylesheets.is_empty() {
            true => Value::Nil,
            false => Value::Array(stylesheets),
        },
    );

    let mut site: HashMap<String, Value> = HashMap::new();
    site.insert("Title".to_owned(), string(&config.site.title));
    site.insert("Description".to_owned(), string(&config.site.description));
    site.insert("URL".to_owned(), Value::String(config.resolve_url("")?));
    m.insert("Site".to_owned(), Value::Object(site));
    Ok(Value::Object(m))
}

fn summary_value(page: &Page) -> Result<Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("Title".to_owned(), string(page.title()));
    m.insert("URL".to_owned(), Value::String(page.url()?));
    m.insert("Date".to_owned(), Value::String(date(page)));
    m.insert("Tags".to_owned(), tags_value(page)?);
    Ok(Value::Object(m))
}

fn tags_value(page: &Page) -> Result<Value> {
    let mut tags: Vec<Value> = Vec::new();
    for tag in page.tags() {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "URL".to_owned(),
            Value::String(page.config.resolve_url(&tag.relative_path())?),
        );
        m.insert("Name".to_owned(), Value::String(tag.name.clone()));
        tags.push(Value::Object(m));
    }
    Ok(Value::Array(tags))
}

fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

fn date(page: &Page) -> String {
    page.date().format("%Y-%m-%d").to_string()
}

/// Renders the `<title>` and `<meta>` tags for a page. Description, image,
/// and handle tags are only emitted when the page or the site provides a
/// value.
pub fn headers(page: &Page) -> Result<String> {
    let mut out = String::new();
    out.push_str("<title>");
    push_escaped(&mut out, page.title());
    out.push_str("</title>\n");

    let description = page.description();
    if !description.is_empty() {
        push_meta(&mut out, "name", "description", description);
        push_meta(&mut out, "property", "og:description", description);
    }
    push_meta(&mut out, "property", "og:title", page.title());
    let image = page.image();
    if !image.is_empty() {
        push_meta(&mut out, "property", "og:image", &page.config.resolve_url(image)?);
    }
    let twitter = page.twitter();
    if !twitter.is_empty() {
        let handle = format!("@{}", twitter);
        push_meta(&mut out, "name", "twitter:card", "summary");
        push_meta(&mut out, "name", "twitter:creator", &handle);
        push_meta(&mut out, "name", "twitter:site", &handle);
    }
    Ok(out)
}

fn push_meta(out: &mut String, attribute: &str, key: &str, content: &str) {
    out.push_str(&format!(r#"<meta {}="{}" content=""#, attribute, key));
    push_escaped(out, content);
    out.push_str("\" />\n");
}

fn push_escaped(out: &mut String, s: &str) {
    // Writing into a String can't fail.
    let _ = escape_html(&mut *out, s);
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// The layout file couldn't be read.
    OpenLayout { path: PathBuf, err: io::Error },

    /// The layout isn't a valid template.
    ParseLayout { path: PathBuf, err: String },

    /// An error executing the layout.
    ExecuteTemplate(String),

    /// A link couldn't be joined onto the site URL.
    UrlParse(url::ParseError),

    /// An error writing the output file.
    Io { path: PathBuf, err: io::Error },
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. This allows us to
    /// use the `?` operator when resolving links.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenLayout { path, err } => {
                write!(f, "Opening layout file '{}': {}", path.display(), err)
            }
            Error::ParseLayout { path, err } => {
                write!(f, "Parsing layout file '{}': {}", path.display(), err)
            }
            Error::ExecuteTemplate(err) => write!(f, "Executing layout: {}", err),
            Error::UrlParse(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "Writing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenLayout { path: _, err } => Some(err),
            Error::ParseLayout { .. } => None,
            Error::ExecuteTemplate(_) => None,
            Error::UrlParse(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}
