//! Sitemap XML ingestion: walks sitemap indices and urlsets, honoring
//! both the standard sitemap namespace and unnamespaced elements.
//! Recursion is bounded by `MAX_DEPTH` and guarded by a visited set to
//! prevent cycles (spec §4.4).

use std::collections::HashSet;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::fetcher::Fetcher;

const MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Sitemap,
    Url,
    Loc,
    Other,
}

fn classify(local_name: &[u8]) -> Element {
    match local_name {
        b"sitemap" => Element::Sitemap,
        b"url" => Element::Url,
        b"loc" => Element::Loc,
        _ => Element::Other,
    }
}

/// One `<loc>` entry found under either `<sitemap>` (a nested index
/// reference) or `<url>` (a page URL).
enum LocEntry {
    SitemapRef(String),
    PageUrl(String),
}

fn parse_locs(xml: &str) -> Vec<LocEntry> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                stack.push(classify(e.local_name().as_ref()));
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(ref text)) => {
                if stack.last() == Some(&Element::Loc) {
                    let value = text.unescape().unwrap_or_default().to_string();
                    if value.is_empty() {
                        continue;
                    }
                    let parent = stack.iter().rev().nth(1).copied();
                    match parent {
                        Some(Element::Sitemap) => entries.push(LocEntry::SitemapRef(value)),
                        Some(Element::Url) => entries.push(LocEntry::PageUrl(value)),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    entries
}

pub struct SitemapParser<'a> {
    fetcher: &'a Fetcher,
}

impl<'a> SitemapParser<'a> {
    pub fn new(fetcher: &'a Fetcher) -> Self {
        Self { fetcher }
    }

    pub async fn parse(&self, sitemap_url: &str) -> Vec<String> {
        let mut urls = Vec::new();
        let mut visited = HashSet::new();
        self.parse_recursive(sitemap_url, &mut urls, &mut visited, 0).await;
        urls
    }

    #[async_recursion::async_recursion]
    async fn parse_recursive(
        &self,
        sitemap_url: &str,
        urls: &mut Vec<String>,
        visited: &mut HashSet<String>,
        depth: usize,
    ) {
        if visited.contains(sitemap_url) {
            return;
        }
        visited.insert(sitemap_url.to_string());

        if depth >= MAX_DEPTH {
            tracing::warn!(sitemap_url, depth, "max sitemap depth reached");
            return;
        }

        let outcome = self.fetcher.download(sitemap_url).await;
        let body = match (&outcome.status_code, &outcome.body) {
            (Some(200), Some(body)) => body,
            _ => {
                tracing::debug!(sitemap_url, "sitemap fetch failed, skipping node");
                return;
            }
        };

        let entries = parse_locs(body);
        let mut nested = Vec::new();

        for entry in entries {
            match entry {
                LocEntry::SitemapRef(url) => nested.push(url),
                LocEntry::PageUrl(url) => urls.push(url),
            }
        }

        for nested_url in nested {
            self.parse_recursive(&nested_url, urls, visited, depth + 1).await;
        }
    }
}
