//! Terminal rendering.
//!
//! Draw functions read the app and its per-render view state; every
//! ordering decision comes from the portfolio view model.

mod renderfns;
mod views;

use crate::app::{App, Mode, ViewMode};
use crate::cache::CacheStatus;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use renderfns::{centered_rect, truncate};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app);

  match app.state().view {
    ViewMode::Timeline => views::timeline::draw(frame, chunks[1], app),
    ViewMode::Vault => views::vault::draw(frame, chunks[1], app),
  }

  if app.state().expanded {
    if let Some(project) = app.selected_project() {
      views::detail::draw(frame, chunks[1], &project);
    }
  }

  if let Some(status) = app.cache_overlay() {
    draw_cache_overlay(frame, chunks[1], status);
  }

  if app.mode() == Mode::Filter {
    views::vault::draw_filter_menu(frame, chunks[1], app);
  }

  draw_status_bar(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
  let title = Paragraph::new(format!(" {}", truncate(app.title(), area.width as usize / 2)))
    .style(Style::default().add_modifier(Modifier::BOLD));
  frame.render_widget(title, area);

  let view_name = match app.state().view {
    ViewMode::Timeline => "Timeline",
    ViewMode::Vault => "Vault",
  };
  let indicator = Paragraph::new(format!("{} ", view_name))
    .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
    .alignment(Alignment::Right);
  frame.render_widget(indicator, area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.mode() {
    Mode::Normal => {
      let hint = match app.state().view {
        ViewMode::Timeline => " /:search  Tab:view  j/k:nav  Enter:open  r:refresh  c:cache  q:quit",
        ViewMode::Vault => " /:search  f:filter  Tab:view  j/k:nav  Enter:open  r:refresh  c:cache  q:quit",
      };
      (hint.to_string(), Style::default().fg(Color::DarkGray))
    }
    Mode::Search => {
      let search = format!("/{}", app.state().search);
      (search, Style::default().fg(Color::Cyan))
    }
    Mode::Filter => (
      " j/k:move  space:toggle  a:all  Esc:done".to_string(),
      Style::default().fg(Color::Yellow),
    ),
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}

fn draw_cache_overlay(frame: &mut Frame, area: Rect, status: &CacheStatus) {
  let overlay = centered_rect(area, 70, 60);
  frame.render_widget(Clear, overlay);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue))
    .title(" Cache Status ")
    .title_alignment(Alignment::Center);
  let inner = block.inner(overlay);
  frame.render_widget(block, overlay);

  let mut lines: Vec<Line> = Vec::new();
  if status.partitions.is_empty() {
    lines.push(Line::from(Span::styled(
      "Cache is empty or disabled.",
      Style::default().fg(Color::DarkGray),
    )));
  }
  for partition in &status.partitions {
    lines.push(Line::from(vec![
      Span::styled(
        partition.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
      ),
      Span::styled(
        format!("  {} entries", partition.entries),
        Style::default().fg(Color::DarkGray),
      ),
    ]));
    for url in partition.urls.iter().take(3) {
      lines.push(Line::from(Span::styled(
        format!("  {}", truncate(url, (inner.width as usize).saturating_sub(2))),
        Style::default().fg(Color::DarkGray),
      )));
    }
    if partition.urls.len() > 3 {
      lines.push(Line::from(Span::styled(
        format!("  ... and {} more", partition.urls.len() - 3),
        Style::default().fg(Color::DarkGray),
      )));
    }
  }

  frame.render_widget(Paragraph::new(lines), inner);
}
