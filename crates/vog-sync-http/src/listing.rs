//! Link extraction from auto-generated directory index pages.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#)
        .expect("href pattern is valid")
});

/// Every `href` target of an anchor, in document order, entity-decoded.
pub fn extract_links(html: &str) -> Vec<String> {
    HREF.captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| decode_entities(m.as_str()))
        .collect()
}

/// What a resolved link points at, relative to the crawl root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Directory(Url),
    File { name: String, url: Url },
}

/// Resolve `href` against the page it appeared on and classify it.
///
/// Returns `None` for links that are not dataset entries: sort/query links,
/// anything outside `root` (parent directories, other hosts), the root
/// itself, and the page itself.
pub fn classify(page: &Url, href: &str, root: &Url) -> Option<Link> {
    let mut url = page.join(href).ok()?;
    url.set_fragment(None);

    if url.query().is_some() || url == *page || url == *root {
        return None;
    }
    if !url.as_str().starts_with(root.as_str()) {
        return None;
    }

    if url.path().ends_with('/') {
        return Some(Link::Directory(url));
    }

    let name = url.path_segments()?.next_back()?.to_owned();
    if name.is_empty() {
        return None;
    }
    Some(Link::File { name, url })
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
