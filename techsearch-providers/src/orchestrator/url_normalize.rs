//! URL canonicalisation for result deduplication.
//!
//! Two links to the same page should compare equal even when they differ
//! in host case, a `www.` prefix, default ports, query parameter order,
//! tracking parameters, fragments or a trailing slash. Video links of any
//! supported shape collapse to the canonical watch URL.

use url::Url;

use crate::video::{extract_video_id, is_video_url, watch_url};

/// Query parameters that never change the page served.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "utm_id",
    "fbclid",
    "gclid",
    "msclkid",
    "mc_cid",
    "mc_eid",
    "ref_src",
    "si",
    "feature",
];

/// Canonical form of `raw` used as a dedup key.
///
/// Unparseable input is returned trimmed but otherwise unchanged.
///
/// ```
/// use techsearch_providers::orchestrator::url_normalize::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://WWW.Example.com:443/docs/?b=2&a=1&utm_source=x#intro"),
///     normalize_url("https://example.com/docs?a=1&b=2"),
/// );
/// assert_eq!(
///     normalize_url("https://youtu.be/dQw4w9WgXcQ?si=abc"),
///     "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
/// );
/// ```
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_video_url(trimmed) {
        if let Some(id) = extract_video_id(trimmed) {
            return watch_url(&id);
        }
    }

    let Ok(mut parsed) = Url::parse(trimmed) else {
        return trimmed.to_owned();
    };

    parsed.set_fragment(None);

    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    if let Some(bare) = parsed
        .host_str()
        .and_then(|host| host.strip_prefix("www."))
        .map(str::to_owned)
    {
        let _ = parsed.set_host(Some(&bare));
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    let path = parsed.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}

fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_case_and_www_are_ignored() {
        assert_eq!(
            normalize_url("HTTPS://WWW.Example.COM/Path"),
            "https://example.com/Path"
        );
    }

    #[test]
    fn trailing_slash_dropped_except_root() {
        assert_eq!(
            normalize_url("https://example.com/guide/"),
            "https://example.com/guide"
        );
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn default_ports_removed_others_kept() {
        assert_eq!(normalize_url("http://example.com:80/a"), "http://example.com/a");
        assert_eq!(normalize_url("https://example.com:443/a"), "https://example.com/a");
        assert_eq!(
            normalize_url("https://example.com:8443/a"),
            "https://example.com:8443/a"
        );
    }

    #[test]
    fn query_sorted_and_tracking_stripped() {
        assert_eq!(
            normalize_url("https://example.com/s?z=1&utm_campaign=x&a=2&gclid=y"),
            "https://example.com/s?a=2&z=1"
        );
        assert_eq!(
            normalize_url("https://example.com/s?utm_source=a&fbclid=b"),
            "https://example.com/s"
        );
    }

    #[test]
    fn ref_param_distinguishes_pages() {
        assert_ne!(
            normalize_url("https://github.com/org/repo/blob/x.rs?ref=main"),
            normalize_url("https://github.com/org/repo/blob/x.rs?ref=dev"),
        );
    }

    #[test]
    fn tracking_keys_matched_case_insensitively() {
        assert_eq!(
            normalize_url("https://example.com/p?UTM_Source=x&q=1"),
            "https://example.com/p?q=1"
        );
    }

    #[test]
    fn fragment_removed() {
        assert_eq!(
            normalize_url("https://example.com/p#section-2"),
            "https://example.com/p"
        );
    }

    #[test]
    fn video_links_collapse_to_watch_url() {
        let canonical = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        for link in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ&feature=share",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            canonical,
        ] {
            assert_eq!(normalize_url(link), canonical, "{link}");
        }
    }

    #[test]
    fn unparseable_input_returned_trimmed() {
        assert_eq!(normalize_url("  not a url "), "not a url");
        assert_eq!(normalize_url(""), "");
    }
}
