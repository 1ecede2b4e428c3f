//! Expanded project card: description, story, links, media, and any
//! remaining fields.

use crate::portfolio::{self, MediaKind, Project};
use crate::ui::renderfns::{centered_rect, media_tag, truncate, type_color};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

pub fn draw(frame: &mut Frame, area: Rect, project: &Project) {
  let overlay = centered_rect(area, 80, 80);
  frame.render_widget(Clear, overlay);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(format!(" {} ", truncate(&project.title, 60)))
    .title_alignment(Alignment::Center);
  let inner = block.inner(overlay);
  frame.render_widget(block, overlay);

  let mut lines: Vec<Line> = Vec::new();

  let mut meta = vec![
    Span::styled(
      format!("[{}] ", project.project_type),
      Style::default().fg(type_color(&project.project_type)),
    ),
    Span::styled(
      portfolio::format_date(project.date),
      Style::default().fg(Color::DarkGray),
    ),
  ];
  if !project.status.is_empty() {
    meta.push(Span::styled(
      format!("  ({})", project.status),
      Style::default().fg(Color::DarkGray),
    ));
  }
  lines.push(Line::from(meta));

  if !project.description.is_empty() {
    push_section(&mut lines, "Description");
    lines.push(Line::from(project.description.clone()));
  }

  if !project.story.is_empty() {
    push_section(&mut lines, "Story");
    lines.push(Line::from(project.story.clone()));
  }

  if !project.links.is_empty() {
    push_section(&mut lines, "Links");
    for link in &project.links {
      lines.push(Line::from(vec![
        Span::raw(format!("  {} ", link.name)),
        Span::styled(format!("<{}>", link.url), Style::default().fg(Color::Blue)),
      ]));
    }
  }

  if !project.media.is_empty() {
    push_section(&mut lines, "Media");
    for item in &project.media {
      lines.push(media_line(item));
    }
  }

  if !project.tags.is_empty() {
    push_section(&mut lines, "Tags");
    lines.push(Line::from(format!("  {}", project.tags.join(", "))));
  }

  if !project.medium.is_empty() {
    push_section(&mut lines, "Medium");
    lines.push(Line::from(format!("  {}", project.medium.join(", "))));
  }

  if !project.extra.is_empty() {
    push_section(&mut lines, "Other Details");
    for (key, value) in &project.extra {
      lines.push(Line::from(vec![
        Span::styled(
          format!("  {}: ", capitalize(key)),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value.clone()),
      ]));
    }
  }

  let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
  frame.render_widget(paragraph, inner);
}

fn push_section(lines: &mut Vec<Line>, heading: &'static str) {
  lines.push(Line::default());
  lines.push(Line::from(Span::styled(
    heading,
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD),
  )));
}

fn media_line(item: &portfolio::MediaItem) -> Line<'static> {
  match item.kind {
    MediaKind::Youtube => match portfolio::extract_youtube_id(&item.url) {
      Some(id) => Line::from(vec![
        Span::styled("  [youtube] ", Style::default().fg(Color::Red)),
        Span::raw(format!("{} ", id)),
        Span::styled(format!("<{}>", item.url), Style::default().fg(Color::Blue)),
      ]),
      None => Line::from(Span::styled(
        format!("  Invalid YouTube URL: {}", item.url),
        Style::default().fg(Color::DarkGray),
      )),
    },
    kind => Line::from(vec![
      Span::styled(
        format!("  [{}] ", media_tag(kind)),
        Style::default().fg(Color::Green),
      ),
      Span::styled(format!("<{}>", item.url), Style::default().fg(Color::Blue)),
    ]),
  }
}

fn capitalize(key: &str) -> String {
  let mut chars = key.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}
