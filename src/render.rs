//! Renders a document body in two passes. The body is first executed as a
//! template so it can call page helpers such as `{{ .Timestamp "..." }}`;
//! the output of that pass is then converted from markdown to HTML. Running
//! the template first means a helper's output is itself formatted as
//! markdown.

use gtmpl::{Context, Template};
use gtmpl_value::Value;
use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// The data a body template may refer to. Only these values and the
/// `timestamp` function are visible to document authors.
pub struct BodyContext<'a> {
    pub title: &'a str,
    pub slug: &'a str,
}

impl BodyContext<'_> {
    fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), Value::String(self.title.to_owned()));
        m.insert("Slug".to_owned(), Value::String(self.slug.to_owned()));
        Value::Object(m)
    }
}

/// Formats `label` as a markdown link to an in-page anchor of the same name,
/// e.g. `[@ 2018-03-24](#2018-03-24)`.
pub fn timestamp(label: &str) -> String {
    format!("[@ {}](#{})", label, label)
}

fn timestamp_helper(args: &[Value]) -> std::result::Result<Value, String> {
    match args {
        [Value::String(label)] => Ok(Value::String(timestamp(label))),
        [other] => Ok(Value::String(timestamp(&other.to_string()))),
        _ => Err(String::from("Timestamp takes exactly one label")),
    }
}

/// gtmpl won't invoke a field with arguments, so `.Timestamp "x"` inside an
/// action is rewritten to the `timestamp` function before parsing. Text
/// outside actions is left alone.
pub fn rewrite_helpers(body: &str) -> String {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    static FIELD: OnceLock<Regex> = OnceLock::new();
    let action = ACTION.get_or_init(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());
    let field = FIELD.get_or_init(|| Regex::new(r"([\s(|{])\.Timestamp\b").unwrap());
    action
        .replace_all(body, |caps: &Captures| {
            field.replace_all(&caps[0], "${1}timestamp").into_owned()
        })
        .into_owned()
}

/// Checks that every `{{` has a closing `}}` and that string literals inside
/// actions are terminated. gtmpl's lexer doesn't return on either, so this
/// runs before every parse.
pub fn check_actions(text: &str) -> std::result::Result<(), String> {
    let mut pos = 0;
    while let Some(open) = text[pos..].find("{{") {
        let start = pos + open;
        pos = match action_end(&text[start + 2..]) {
            Ok(len) => start + 2 + len,
            Err(problem) => {
                return Err(format!("{} at line {}", problem, line_of(text, start)))
            }
        };
    }
    Ok(())
}

// Returns the length of an action's contents up to and including its `}}`.
// A `}}` inside a string or a comment doesn't close the action.
fn action_end(action: &str) -> std::result::Result<usize, &'static str> {
    let trimmed = action.trim_start_matches('-').trim_start();
    if trimmed.starts_with("/*") {
        let skipped = action.len() - trimmed.len();
        return match trimmed.find("*/") {
            Some(end) => match trimmed[end + 2..].find("}}") {
                Some(close) => Ok(skipped + end + 2 + close + 2),
                None => Err("unclosed action"),
            },
            None => Err("unclosed comment"),
        };
    }

    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = action.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match quote {
            Some('"') if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '`' => quote = Some(c),
            None if c == '}' && chars.peek().map(|(_, next)| *next) == Some('}') => {
                return Ok(i + 2)
            }
            None => {}
        }
    }
    match quote {
        Some(_) => Err("unterminated string in action"),
        None => Err("unclosed action"),
    }
}

fn line_of(text: &str, index: usize) -> usize {
    text[..index].matches('\n').count() + 1
}

/// Executes `body` as a template against `context`. The result is still
/// markdown.
pub fn execute_body(body: &str, context: &BodyContext) -> Result<String> {
    if body.trim().is_empty() {
        return Ok(String::new());
    }
    check_actions(body).map_err(Error::ParseTemplate)?;
    let mut template = Template::default();
    template.add_func("timestamp", timestamp_helper);
    template
        .parse(rewrite_helpers(body))
        .map_err(Error::ParseTemplate)?;

    let context = Context::from(context.to_value()).map_err(Error::ExecuteTemplate)?;
    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    template
        .execute(&mut out, &context)
        .map_err(Error::ExecuteTemplate)?;
    Ok(String::from_utf8(out)?)
}

/// Converts markdown to HTML. The result is trusted and is not escaped again
/// when it is placed into a layout.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

/// Runs both passes over `body`.
pub fn render(body: &str, context: &BodyContext) -> Result<String> {
    Ok(markdown_to_html(&execute_body(body, context)?))
}

/// Represents the result of rendering a body.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem rendering a body.
#[derive(Debug)]
pub enum Error {
    /// The body is not a valid template.
    ParseTemplate(String),

    /// The body template failed while executing.
    ExecuteTemplate(String),

    /// The template produced bytes that aren't UTF-8.
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseTemplate(err) => write!(f, "parsing body template: {}", err),
            Error::ExecuteTemplate(err) => write!(f, "executing body template: {}", err),
            Error::Utf8(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ParseTemplate(_) => None,
            Error::ExecuteTemplate(_) => None,
            Error::Utf8(err) => Some(err),
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    /// Converts a [`std::string::FromUtf8Error`] into an [`Error`].
    fn from(err: std::string::FromUtf8Error) -> Error {
        Error::Utf8(err)
    }
}
