//! `Link` header pagination.
//!
//! GitHub advertises further pages in a header of the form
//! `<https://api.github.com/orgs/acme/repos?page=2>; rel="next", <...>; rel="last"`.
//! Listing stops when no `rel="next"` link is present.

use reqwest::header::{HeaderMap, LINK};
use reqwest::Url;

/// Returns the page number of the `rel="next"` link, if any.
pub fn next_page(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get(LINK)?.to_str().ok()?;
    parse_next_page(link)
}

/// Parses the `rel="next"` page number out of a `Link` header value.
pub fn parse_next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == r#"rel="next""# || p == "rel=next"
        });
        if !is_next {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
