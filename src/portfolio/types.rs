use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Reserved id of the synthetic timeline entry representing "now".
pub const PRESENT_MOMENT_ID: &str = "present-moment";

/// A single normalized portfolio entry.
///
/// Every field is defaulted during normalization; see `raw.rs` for the
/// defaulting rules. `date` is `None` for entries whose date is missing or
/// unparseable ("Undated").
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
  pub id: String,
  pub title: String,
  /// Free-form category from the feed's `type` column, e.g. "software"
  pub project_type: String,
  pub status: String,
  pub description: String,
  pub story: String,
  pub date: Option<NaiveDate>,
  pub links: Vec<Link>,
  pub media: Vec<MediaItem>,
  pub tags: Vec<String>,
  pub medium: Vec<String>,
  /// Remaining record fields as (key, display value), for the detail pane
  pub extra: Vec<(String, String)>,
  pub is_present_moment: bool,
}

/// A named external link.
///
/// Invariant: `url` is never empty or the `"#"` placeholder, and starts
/// with `http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
  pub name: String,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
  pub url: String,
  pub kind: MediaKind,
}

/// How a media URL should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
  Image,
  Video,
  Youtube,
  /// Rendered as a plain external link, not an inline media item
  Unknown,
}

impl MediaKind {
  /// Classify a media URL by file extension first, then by host.
  pub fn classify(url: &str) -> Self {
    if image_re().is_match(url) {
      MediaKind::Image
    } else if video_re().is_match(url) {
      MediaKind::Video
    } else if youtube_re().is_match(url) {
      MediaKind::Youtube
    } else {
      MediaKind::Unknown
    }
  }
}

fn image_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)\.(jpe?g|png|gif|webp)$").expect("valid regex"))
}

fn video_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)\.(mp4|webm|ogg)$").expect("valid regex"))
}

fn youtube_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)(youtube\.com|youtu\.be)").expect("valid regex"))
}

/// Extract the video id from a YouTube URL.
///
/// Accepts the usual shapes (`youtu.be/<id>`, `watch?v=<id>`, `embed/<id>`,
/// `v/<id>`, `u/<c>/<id>`, `&v=<id>`). A capture that is not exactly 11
/// characters is treated as an invalid URL and yields `None`; the caller
/// renders a placeholder instead of an embed.
pub fn extract_youtube_id(url: &str) -> Option<&str> {
  static RE: OnceLock<Regex> = OnceLock::new();
  let re = RE.get_or_init(|| {
    Regex::new(r"(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*)").expect("valid regex")
  });

  let id = re.captures(url)?.get(2)?.as_str();
  if id.len() == 11 {
    Some(id)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_classify_image_extensions() {
    assert_eq!(MediaKind::classify("a.png"), MediaKind::Image);
    assert_eq!(MediaKind::classify("https://cdn.test/shot.JPEG"), MediaKind::Image);
    assert_eq!(MediaKind::classify("pic.webp"), MediaKind::Image);
  }

  #[test]
  fn test_classify_video_extensions() {
    assert_eq!(MediaKind::classify("clip.mp4"), MediaKind::Video);
    assert_eq!(MediaKind::classify("https://cdn.test/loop.webm"), MediaKind::Video);
  }

  #[test]
  fn test_classify_youtube_hosts() {
    assert_eq!(
      MediaKind::classify("https://youtu.be/dQw4w9WgXcQ"),
      MediaKind::Youtube
    );
    assert_eq!(
      MediaKind::classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
      MediaKind::Youtube
    );
  }

  #[test]
  fn test_classify_extension_wins_over_host() {
    // Extension patterns are checked before the host pattern
    assert_eq!(
      MediaKind::classify("https://youtube.com/thumb.png"),
      MediaKind::Image
    );
  }

  #[test]
  fn test_classify_unknown() {
    assert_eq!(MediaKind::classify("https://example.test/page"), MediaKind::Unknown);
    assert_eq!(MediaKind::classify("track.mp3"), MediaKind::Unknown);
  }

  #[test]
  fn test_extract_youtube_id_variants() {
    assert_eq!(
      extract_youtube_id("https://youtu.be/dQw4w9WgXcQ"),
      Some("dQw4w9WgXcQ")
    );
    assert_eq!(
      extract_youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
      Some("dQw4w9WgXcQ")
    );
    assert_eq!(
      extract_youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0"),
      Some("dQw4w9WgXcQ")
    );
  }

  #[test]
  fn test_extract_youtube_id_rejects_wrong_length() {
    assert_eq!(extract_youtube_id("https://youtu.be/short"), None);
    assert_eq!(extract_youtube_id("https://example.test/"), None);
  }
}
