//! Video URL recognition and identifier extraction.
//!
//! Shared by the router (is this a video link?) and the transcript
//! adapter (which video?).

use url::Url;

/// Host substrings that mark a query as a video link.
pub const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];

/// Length of a YouTube video identifier.
const VIDEO_ID_LEN: usize = 11;

/// Path prefixes on youtube.com that carry the id as the next segment.
const ID_PATH_PREFIXES: &[&str] = &["embed", "shorts", "live", "v", "e"];

/// Returns `true` if `text` mentions a recognised video host.
pub fn is_video_url(text: &str) -> bool {
    let lower = text.to_lowercase();
    VIDEO_HOSTS.iter().any(|host| lower.contains(host))
}

/// Extract a video identifier from a URL or a bare id.
///
/// Accepts:
/// - `https://www.youtube.com/watch?v=ID` (any host under youtube.com)
/// - `https://youtu.be/ID`
/// - `https://www.youtube.com/{embed,shorts,live,v}/ID`
/// - URLs without a scheme (`youtu.be/ID`)
/// - a bare 11-character id
///
/// ```
/// use techsearch_providers::video::extract_video_id;
///
/// assert_eq!(
///     extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=42").as_deref(),
///     Some("dQw4w9WgXcQ")
/// );
/// assert_eq!(extract_video_id("not a video"), None);
/// ```
pub fn extract_video_id(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if is_video_id(trimmed) {
        return Some(trimmed.to_owned());
    }

    let parsed = Url::parse(trimmed)
        .or_else(|_| Url::parse(&format!("https://{trimmed}")))
        .ok()?;
    let host = parsed.host_str()?.to_lowercase();

    let candidate = if host == "youtu.be" || host.ends_with(".youtu.be") {
        parsed.path_segments()?.next().map(str::to_owned)
    } else if is_youtube_host(&host) {
        let from_query = parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned());
        from_query.or_else(|| {
            let mut segments = parsed.path_segments()?;
            let first = segments.next()?;
            ID_PATH_PREFIXES
                .contains(&first)
                .then(|| segments.next().map(str::to_owned))
                .flatten()
        })
    } else {
        None
    };

    candidate.filter(|id| is_video_id(id))
}

fn is_youtube_host(host: &str) -> bool {
    host == "youtube.com"
        || host.ends_with(".youtube.com")
        || host == "youtube-nocookie.com"
        || host.ends_with(".youtube-nocookie.com")
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Canonical watch URL for an id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
