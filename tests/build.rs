use scrivener::build::build_site;
use scrivener::config::{Config, CONFIG_FILE};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PAGE_LAYOUT: &str = r#"<html>
<head>
{{ .Headers }}{{ if has . "Assets" }}{{ template "assets" . }}{{ end }}
</head>
<body>{{ .Content }}</body>
</html>
"#;

const INDEX_LAYOUT: &str = r#"<html>
<head>
{{ .Headers }}{{ if .HasAssets }}{{ template "assets" . }}{{ end }}
</head>
<body>{{ .Index }}</body>
</html>
"#;

const ZOMG: &str = r#"---
title: zomg is a thing
timestamp: 2018-03-01T00:00:00Z
tags: [foo, bar]
---
# zomg

{{ .Timestamp "2018-03-24T12:43:03" }} something happened.
"#;

const TWO: &str = r#"---
title: the second
description: all about two
timestamp: 2018-06-01T00:00:00Z
tags: [bar]
---
two {{ .Timestamp "2018-06-01T09:30:00" }}
"#;

const ONE: &str = r#"---
title: the first
timestamp: 2018-01-01T00:00:00Z
---
one {{ .Timestamp .Slug }}
"#;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new(config: &str) -> Project {
        let project = Project {
            dir: tempfile::tempdir().unwrap(),
        };
        project.write(CONFIG_FILE, config);
        project.write("layouts/page.html", PAGE_LAYOUT);
        project.write("layouts/index.html", INDEX_LAYOUT);
        project
    }

    fn write(&self, path: &str, contents: &str) {
        let path = self.dir.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn build(&self) -> scrivener::build::Result<Config> {
        let config = Config::from_file(&self.dir.path().join(CONFIG_FILE)).unwrap();
        build_site(&config)?;
        Ok(config)
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn read(&self, path: &str) -> String {
        let path = self.out().join(path);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("reading {}: {}", path.display(), err))
    }

    fn link(&self, page: &str) -> String {
        self.out().join(page).display().to_string()
    }
}

fn blog() -> Project {
    let project = Project::new(
        "source: src\noutput: out\ntitle: my blog\ndescription: my default description\ntwitter: someone\nname: Some One\nemail: someone@example.org\n",
    );
    project.write("src/zomg.md", ZOMG);
    project.write("src/two.md", TWO);
    project.write("src/one.md", ONE);
    project.write("src/boom.wtf", "not a document");
    project
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("`{}` not found in:\n{}", needle, haystack))
}

#[test]
fn test_pages() -> scrivener::build::Result<()> {
    let project = blog();
    project.build()?;

    let html = project.read("zomg.html");
    assert!(html.contains("<title>zomg is a thing</title>"), "{}", html);
    assert!(html.contains("<h1>zomg</h1>"), "{}", html);
    assert!(
        html.contains(r##"<a href="#2018-03-24T12:43:03">@ 2018-03-24T12:43:03</a> something happened."##),
        "{}",
        html
    );
    // No front matter leaks into the output.
    assert!(!html.contains("timestamp:"), "{}", html);
    assert!(!html.contains("tags:"), "{}", html);

    assert!(!project.out().join("boom.html").exists());
    assert!(!project.out().join("boom.wtf").exists());
    Ok(())
}

#[test]
fn test_index_lists_pages_newest_first() -> scrivener::build::Result<()> {
    let project = blog();
    project.build()?;

    let html = project.read("index.html");
    assert!(html.contains("<title>my blog</title>"), "{}", html);
    let zomg = position(
        &html,
        &format!(r#"<a href="{}">zomg is a thing</a>"#, project.link("zomg.html")),
    );
    let two = position(
        &html,
        &format!(r#"<a href="{}">the second</a>"#, project.link("two.html")),
    );
    let one = position(
        &html,
        &format!(r#"<a href="{}">the first</a>"#, project.link("one.html")),
    );
    assert!(two < zomg && zomg < one, "{}", html);
    assert!(html.contains(r#"<time datetime="2018-06-01">2018-06-01</time>"#));

    // The helper ran on every page that was ordered.
    assert!(project
        .read("two.html")
        .contains(r##"<p>two <a href="#2018-06-01T09:30:00">@ 2018-06-01T09:30:00</a></p>"##));
    assert!(project
        .read("one.html")
        .contains(r##"<p>one <a href="#one">@ one</a></p>"##));
    Ok(())
}

#[test]
fn test_tag_pages() -> scrivener::build::Result<()> {
    let project = blog();
    project.build()?;

    let zomg = format!(r#"<a href="{}">zomg is a thing</a>"#, project.link("zomg.html"));
    let two = format!(r#"<a href="{}">the second</a>"#, project.link("two.html"));

    let foo = project.read("tag/foo.html");
    assert!(foo.contains(&zomg), "{}", foo);
    assert!(!foo.contains(&two), "{}", foo);

    let bar = project.read("tag/bar.html");
    assert!(position(&bar, &two) < position(&bar, &zomg), "{}", bar);
    assert!(!bar.contains("the first"), "{}", bar);

    // Index pages link to the tag pages.
    let index = project.read("index.html");
    assert!(index.contains(&format!(
        r#"<a href="{}">foo</a>"#,
        project.link("tag/foo.html")
    )));
    Ok(())
}

#[test]
fn test_feed_matches_index() -> scrivener::build::Result<()> {
    let project = blog();
    project.build()?;

    let xml = project.read("index.rss");
    assert_eq!(3, xml.matches("<item>").count(), "{}", xml);
    let two = position(&xml, "<title>the second</title>");
    let zomg = position(&xml, "<title>zomg is a thing</title>");
    let one = position(&xml, "<title>the first</title>");
    assert!(two < zomg && zomg < one, "{}", xml);

    assert!(xml.contains("<description><![CDATA[all about two]]></description>"), "{}", xml);
    // No description: the title stands in.
    assert!(xml.contains("<description><![CDATA[the first]]></description>"), "{}", xml);
    assert!(xml.contains("<author>someone@example.org (Some One)</author>"), "{}", xml);
    assert!(xml.contains(&format!("<link>{}</link>", project.link("two.html"))), "{}", xml);
    Ok(())
}

#[test]
fn test_feed_links_use_site_url() -> scrivener::build::Result<()> {
    let project = Project::new("output: out\nsite-url: https://example.org/blog\n");
    project.write("src/zomg.md", ZOMG);
    project.build()?;

    let xml = project.read("index.rss");
    assert!(xml.contains("<link>https://example.org/blog/</link>"), "{}", xml);
    assert!(xml.contains("<link>https://example.org/blog/zomg.html</link>"), "{}", xml);
    let index = project.read("index.html");
    assert!(index.contains(r#"<a href="https://example.org/blog/zomg.html">zomg is a thing</a>"#));
    Ok(())
}

#[test]
fn test_metadata_inheritance() -> scrivener::build::Result<()> {
    let project = blog();
    project.build()?;

    let inherited = project.read("zomg.html");
    assert!(inherited.contains(r#"<meta name="description" content="my default description" />"#));
    assert!(inherited.contains(r#"<meta property="og:description" content="my default description" />"#));
    assert!(inherited.contains(r#"<meta property="og:title" content="zomg is a thing" />"#));
    assert!(inherited.contains(r#"<meta name="twitter:creator" content="@someone" />"#));
    assert!(!inherited.contains("og:image"), "{}", inherited);

    let overridden = project.read("two.html");
    assert!(overridden.contains(r#"<meta name="description" content="all about two" />"#));
    assert!(!overridden.contains("my default description"));
    Ok(())
}

#[test]
fn test_title_defaults_to_slug() -> scrivener::build::Result<()> {
    let project = Project::new("output: out\n");
    project.write("src/three.md", "# three\n\nlook, i have no data!\n");
    project.build()?;

    assert!(project.read("three.html").contains("<title>three</title>"));
    // Without a site title the index falls back to its own slug.
    assert!(project.read("index.html").contains("<title>index</title>"));
    Ok(())
}

#[test]
fn test_single_file_source() -> scrivener::build::Result<()> {
    let project = Project::new("source: zomg.md\noutput: out\n");
    project.write("zomg.md", ZOMG);
    project.write("other.md", ONE);
    project.build()?;

    assert!(project.out().join("zomg.html").is_file());
    assert!(!project.out().join("other.html").exists());
    Ok(())
}

#[test]
fn test_assets() -> scrivener::build::Result<()> {
    let project = Project::new("output: out\nassets:\n  css: [style.css]\n  images: [avatar.jpg]\n");
    project.write("assets/css/style.css", "body {}");
    project.write("assets/images/avatar.jpg", "jpeg");
    project.write("src/zomg.md", ZOMG);
    project.build()?;

    assert_eq!("body {}", project.read("css/style.css"));
    assert_eq!("jpeg", project.read("images/avatar.jpg"));
    let link = |href: &str| format!(r#"<link type="text/css" rel="stylesheet" href="{}">"#, href);
    assert!(project.read("zomg.html").contains(&link("css/style.css")));
    assert!(project.read("index.html").contains(&link("css/style.css")));
    assert!(project.read("tag/foo.html").contains(&link("../css/style.css")));
    Ok(())
}

#[test]
fn test_no_assets() -> scrivener::build::Result<()> {
    let project = blog();
    project.build()?;
    assert!(!project.read("zomg.html").contains("<link"));
    assert!(!project.read("index.html").contains("<link"));
    assert!(!project.out().join("css").exists());
    Ok(())
}

#[test]
fn test_build_is_idempotent() -> scrivener::build::Result<()> {
    let project = blog();
    let paths = [
        "zomg.html",
        "two.html",
        "one.html",
        "index.html",
        "tag/foo.html",
        "tag/bar.html",
        "index.rss",
    ];
    project.build()?;
    let first: Vec<String> = paths.iter().map(|p| project.read(p)).collect();
    project.build()?;
    let second: Vec<String> = paths.iter().map(|p| project.read(p)).collect();
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_equal_dates() -> scrivener::build::Result<()> {
    let project = Project::new("output: out\n");
    let stamp = "---\ntimestamp: 2018-01-01T00:00:00Z\n---\nsame time\n";
    project.write("src/a.md", stamp);
    project.write("src/b.md", stamp);
    project.build()?;

    // Pages with equal dates have no defined relative order; only check that
    // both are listed.
    let html = project.read("index.html");
    position(&html, &format!(r#"<a href="{}">a</a>"#, project.link("a.html")));
    position(&html, &format!(r#"<a href="{}">b</a>"#, project.link("b.html")));
    Ok(())
}

#[test]
fn test_colliding_tag_slugs() -> scrivener::build::Result<()> {
    let project = Project::new("output: out\n");
    project.write("src/a.md", "---\ntags: [C]\n---\na\n");
    project.write("src/b.md", "---\ntags: [\"C++\"]\n---\nb\n");
    project.build()?;

    let c = project.read("tag/c.html");
    let cpp = project.read("tag/c-2.html");
    assert!(c.contains(&format!(r#"<a href="{}">a</a>"#, project.link("a.html"))), "{}", c);
    assert!(!c.contains(&project.link("b.html")), "{}", c);
    assert!(cpp.contains(&format!(r#"<a href="{}">b</a>"#, project.link("b.html"))), "{}", cpp);

    let index = project.read("index.html");
    assert!(index.contains(&format!(r#"<a href="{}">C++</a>"#, project.link("tag/c-2.html"))));
    Ok(())
}

#[test]
fn test_unclosed_body_action() {
    let project = Project::new("output: out\n");
    project.write("src/broken.md", "# broken\n\n{{ .Title \n");
    let err = project.build().err().expect("build should fail");
    assert!(err.to_string().contains("broken.md"), "{}", err);
    assert!(err.to_string().contains("unclosed action"), "{}", err);
}

#[test]
fn test_missing_layout() {
    let project = Project::new("output: out\nlayouts:\n  page: layouts/nope.html\n");
    project.write("src/zomg.md", ZOMG);
    let err = project.build().err().expect("build should fail");
    assert!(err.to_string().contains("nope.html"), "{}", err);
}

#[test]
fn test_malformed_front_matter() {
    let project = Project::new("output: out\n");
    project.write("src/bad.md", "---\ntags: [oops\n---\nbody\n");
    let err = project.build().err().expect("build should fail");
    assert!(err.to_string().contains("bad.md"), "{}", err);
}

#[test]
fn test_missing_source() {
    let project = Project::new("source: nowhere\noutput: out\n");
    assert!(project.build().is_err());
    assert!(!Path::new(&project.out().join("index.html")).exists());
}
