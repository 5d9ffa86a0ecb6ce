//! Link header pagination
//!
//! GitHub advertises further pages through an RFC 8288 `Link` header such as
//! `<https://api.github.com/orgs/acme/repos?page=2&per_page=100>; rel="next"`.
//! A missing `rel="next"` entry marks the last page.

use url::Url;

/// Extract the page number of the `rel="next"` entry, if any
pub fn next_page_from_link(link_header: &str) -> Option<u32> {
    link_header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse::<u32>().ok())
    })
}

/// Read the next page from a response's headers
pub(crate) fn next_page(headers: &reqwest::header::HeaderMap) -> Option<u32> {
    headers
        .get(reqwest::header::LINK)
        .and_then(|value| value.to_str().ok())
        .and_then(next_page_from_link)
}
