//! Defines the [`Config`] type and the logic for loading it from a project
//! file. The resolved [`Config`] is immutable and is passed by reference to
//! every stage of the build.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The default project file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".station.yml";

/// The on-disk shape of the project file. Paths are relative to the project
/// file's directory.
#[derive(Deserialize, Default)]
#[serde(default)]
struct Project {
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    layouts: Layouts,
    #[serde(rename = "site-url")]
    site_url: Option<Url>,
    title: String,
    description: String,
    name: String,
    email: String,
    twitter: String,
    image: String,
    assets: Option<Assets>,
}

/// The layout templates.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Layouts {
    /// The layout for content pages.
    pub page: PathBuf,

    /// The layout for the index and tag pages.
    pub index: PathBuf,
}

impl Default for Layouts {
    fn default() -> Self {
        Layouts {
            page: PathBuf::from("layouts/page.html"),
            index: PathBuf::from("layouts/index.html"),
        }
    }
}

/// The asset file names. Stylesheets live under `assets/css` in the project
/// and images under `assets/images`.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Assets {
    pub css: Vec<String>,
    pub images: Vec<String>,
}

impl Assets {
    /// Whether there is anything to copy or link.
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.images.is_empty()
    }
}

/// Metadata for the feed channel and the site-wide defaults that pages fall
/// back on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Site {
    pub title: String,
    pub description: String,

    /// Author name, used in the feed.
    pub name: String,

    /// Author email, used in the feed.
    pub email: String,

    /// Default author handle.
    pub twitter: String,

    /// Default preview image, relative to the site root.
    pub image: String,
}

/// The resolved configuration for a run.
#[derive(Clone, Debug)]
pub struct Config {
    /// The project directory; asset sources are found under
    /// `{project_directory}/assets`.
    pub project_directory: PathBuf,

    /// Either a single markdown file or a directory of them.
    pub source: PathBuf,

    /// The absolute output directory.
    pub output: PathBuf,

    pub layouts: Layouts,

    /// The public root of the site. Always ends in `/`.
    pub site_url: Option<Url>,

    pub site: Site,

    /// `None` when no assets are configured.
    pub assets: Option<Assets>,
}

impl Config {
    /// Loads the project file at `path`, resolving relative paths against its
    /// parent directory.
    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project_directory = match path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => PathBuf::from("."),
            Some(dir) => dir.to_owned(),
            None => {
                return Err(anyhow!(
                    "Can't get parent directory for provided project file path '{:?}'",
                    path
                ))
            }
        };
        Config::from_str(&contents, &project_directory)
            .with_context(|| format!("Loading configuration `{}`", path.display()))
    }

    /// Parses project file contents. `project_directory` anchors relative
    /// paths.
    pub fn from_str(contents: &str, project_directory: &Path) -> Result<Config> {
        let project: Project = if contents.trim().is_empty() {
            Project::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        let project_directory = absolute(project_directory)?;
        let source = project.source.unwrap_or_else(|| PathBuf::from("src"));
        let output = project.output.unwrap_or_else(|| PathBuf::from("out"));
        let layouts = Layouts {
            page: project_directory.join(&project.layouts.page),
            index: project_directory.join(&project.layouts.index),
        };

        Ok(Config {
            source: project_directory.join(source),
            output: project_directory.join(output),
            layouts,
            site_url: project.site_url.map(with_trailing_slash),
            site: Site {
                title: project.title,
                description: project.description,
                name: project.name,
                email: project.email,
                twitter: project.twitter,
                image: project.image,
            },
            assets: project.assets.filter(|assets| !assets.is_empty()),
            project_directory,
        })
    }

    /// Resolves a path relative to the site root into the form used for
    /// links: joined onto the site URL when there is one, otherwise an
    /// absolute path inside the output directory.
    pub fn resolve_url(&self, relative: &str) -> std::result::Result<String, url::ParseError> {
        match &self.site_url {
            Some(site_url) => Ok(site_url.join(relative)?.to_string()),
            None => Ok(self.output.join(relative).display().to_string()),
        }
    }

    /// The stylesheet names, empty when no assets are configured.
    pub fn stylesheets(&self) -> &[String] {
        match &self.assets {
            Some(assets) => &assets.css,
            None => &[],
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }
    Ok(std::env::current_dir()
        .context("Resolving working directory")?
        .join(path))
}

// Without a trailing slash, `Url::join` treats the last segment as a file
// name and replaces it.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
