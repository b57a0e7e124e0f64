// components/media_url/src/lib.rs
//! Rewrites the short-link shapes of video URLs into the canonical
//! `https://www.youtube.com/watch?v=<id>` form.
//!
//! Normalization is best-effort: anything that is not a recognized shape, or
//! whose identifier cannot be extracted, comes back unchanged.

use url::Url;

/// Prefix of every canonical watch URL. The video identifier follows it.
pub const CANONICAL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Path prefixes on the main host that carry the identifier as the next segment.
const ID_PATH_PREFIXES: [&str; 4] = ["shorts", "embed", "live", "v"];

/// Normalize a video URL.
///
/// # Examples
/// ```
/// assert_eq!(
///     media_url::normalize("https://youtu.be/abc123?si=xyz"),
///     "https://www.youtube.com/watch?v=abc123"
/// );
/// assert_eq!(media_url::normalize("not a url"), "not a url");
/// ```
pub fn normalize(input: &str) -> String {
    match video_id(input) {
        Some(id) => canonical(&id),
        None => input.to_string(),
    }
}

/// Extract the video identifier from any recognized URL shape.
pub fn video_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    let candidate = if is_short_link_host(&host) {
        url.path_segments()?.next().map(str::to_owned)
    } else if is_main_host(&host) {
        id_from_query(&url).or_else(|| id_from_path(&url))
    } else {
        None
    };

    candidate.filter(|id| is_valid_id(id))
}

/// True when the input already is exactly the canonical form.
pub fn is_canonical(input: &str) -> bool {
    video_id(input).is_some_and(|id| canonical(&id) == input)
}

/// Build the canonical watch URL for an identifier.
pub fn canonical(id: &str) -> String {
    format!("{CANONICAL_PREFIX}{id}")
}

fn is_short_link_host(host: &str) -> bool {
    host == "youtu.be" || host == "www.youtu.be"
}

fn is_main_host(host: &str) -> bool {
    host == "youtube.com"
        || host.ends_with(".youtube.com")
        || host == "youtube-nocookie.com"
        || host.ends_with(".youtube-nocookie.com")
}

fn id_from_query(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
}

fn id_from_path(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    let prefix = segments.next()?;
    if !ID_PATH_PREFIXES.contains(&prefix) {
        return None;
    }
    segments.next().map(str::to_owned)
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
