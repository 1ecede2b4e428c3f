use crate::portfolio::MediaKind;
use ratatui::prelude::{Color, Constraint, Direction, Layout, Rect};

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Stable accent color for a project type
pub fn type_color(project_type: &str) -> Color {
  const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Red,
  ];

  if project_type == "now" {
    return Color::White;
  }
  let sum: usize = project_type.bytes().map(|b| b as usize).sum();
  PALETTE[sum % PALETTE.len()]
}

/// Short tag shown next to a media entry
pub fn media_tag(kind: MediaKind) -> &'static str {
  match kind {
    MediaKind::Image => "image",
    MediaKind::Video => "video",
    MediaKind::Youtube => "youtube",
    MediaKind::Unknown => "link",
  }
}

/// A centered sub-rectangle taking the given percentages of the area
pub fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
  let vertical = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - percent_y) / 2),
      Constraint::Percentage(percent_y),
      Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

  let horizontal = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - percent_x) / 2),
      Constraint::Percentage(percent_x),
      Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1]);

  horizontal[1]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("héllo wörld", 8), "héllo...");
  }

  #[test]
  fn test_type_color_is_stable() {
    assert_eq!(type_color("software"), type_color("software"));
    assert_eq!(type_color("now"), Color::White);
  }

  #[test]
  fn test_media_tag() {
    assert_eq!(media_tag(MediaKind::Image), "image");
    assert_eq!(media_tag(MediaKind::Unknown), "link");
  }
}
