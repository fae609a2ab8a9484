//! Groups pages by tag and builds one aggregate page per tag.

use crate::config::Config;
use crate::page::{Page, Tag};
use std::collections::{HashMap, HashSet};

/// Gives every distinct tag name its own file name. The first name seen keeps
/// its plain slug; a later name whose slug is taken gets `-2`, `-3`, and so
/// on, so `C`, `C++` and `C#` land in `c`, `c-2` and `c-3`. Pages are visited
/// in order, so the result only depends on the order of `pages`.
pub fn assign_slugs(pages: &mut [Page]) {
    let mut taken: HashSet<String> = HashSet::new();
    let mut slugs: HashMap<String, String> = HashMap::new();
    for page in pages.iter_mut() {
        for tag in page.tags.iter_mut() {
            let slug = slugs.entry(tag.name.clone()).or_insert_with(|| {
                let base = match tag.slug.is_empty() {
                    true => String::from("tag"),
                    false => tag.slug.clone(),
                };
                let mut candidate = base.clone();
                let mut n = 2;
                while taken.contains(&candidate) {
                    candidate = format!("{}-{}", base, n);
                    n += 1;
                }
                taken.insert(candidate.clone());
                candidate
            });
            tag.slug = slug.clone();
        }
    }
}

/// Maps each tag to the pages carrying it. Tags are kept in the order they
/// were first seen and each bucket keeps the order of the input pages.
pub struct TagIndex<'a> {
    tags: Vec<Tag>,
    buckets: HashMap<String, Vec<&'a Page<'a>>>,
}

impl<'a> TagIndex<'a> {
    /// Indexes `pages`, which should already be sorted. Tags are keyed by
    /// name, so `Rust` and `rust` get separate pages.
    pub fn build(pages: &'a [Page<'a>]) -> TagIndex<'a> {
        let mut index = TagIndex {
            tags: Vec::new(),
            buckets: HashMap::new(),
        };
        for page in pages {
            for tag in page.tags() {
                match index.buckets.get_mut(&tag.name) {
                    Some(bucket) => bucket.push(page),
                    None => {
                        index.buckets.insert(tag.name.clone(), vec![page]);
                        index.tags.push(tag.clone());
                    }
                }
            }
        }
        index
    }

    /// The tags in first-seen order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The pages carrying `tag`, in input order.
    pub fn pages(&self, tag: &Tag) -> &[&'a Page<'a>] {
        match self.buckets.get(&tag.name) {
            Some(pages) => pages,
            None => &[],
        }
    }

    /// Builds the aggregate page for every tag, written to `tag/<slug>.html`.
    pub fn tag_pages(&self, config: &'a Config) -> Vec<Page<'a>> {
        self.tags
            .iter()
            .map(|tag| Page::aggregate(config, tag.relative_path(), self.pages(tag).to_vec()))
            .collect()
    }
}
