//! Hyperlink extraction from fetched HTML, resolved against the page's
//! own URL. Only `http`/`https` links survive (spec §4.6).

use scraper::{Html, Selector};
use url::Url;

/// Extracts `<a href>` targets from `content`, resolves them against
/// `base_url`, and discards anything that isn't `http`/`https` after
/// resolution.
pub fn extract_links(content: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(content);
    let selector = match Selector::parse("a") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|resolved| matches!(resolved.scheme(), "http" | "https"))
        .map(|resolved| resolved.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_links() {
        let html = r#"<html><body><a href="/a">a</a></body></html>"#;
        let links = extract_links(html, "http://x.test/");
        assert_eq!(links, vec!["http://x.test/a"]);
    }

    #[test]
    fn drops_non_http_schemes() {
        let html = r#"<a href="mailto:a@x.test">mail</a><a href="javascript:void(0)">js</a>"#;
        let links = extract_links(html, "http://x.test/");
        assert!(links.is_empty());
    }

    #[test]
    fn drops_empty_hrefs() {
        let html = r#"<a href="">empty</a><a>no href</a>"#;
        let links = extract_links(html, "http://x.test/");
        assert!(links.is_empty());
    }

    #[test]
    fn keeps_absolute_links() {
        let html = r#"<a href="http://other.test/foo">other</a>"#;
        let links = extract_links(html, "http://x.test/");
        assert_eq!(links, vec!["http://other.test/foo"]);
    }

    #[test]
    fn unparseable_base_yields_no_links() {
        let html = r#"<a href="/a">a</a>"#;
        assert!(extract_links(html, "not a url").is_empty());
    }
}
