//! Timeline view: year-grouped entries, newest first, with the live
//! present-moment entry pinned to the top.

use crate::app::App;
use crate::portfolio::{self, TimelineRow};
use crate::query::QueryState;
use crate::ui::renderfns::{truncate, type_color};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
  let rows = app.timeline_rows();

  let title = match app.projects().state() {
    QueryState::Loading => " Timeline (loading...) ".to_string(),
    QueryState::Error(e) => format!(" Timeline (error: {}) ", truncate(e, 40)),
    // The present-moment entry is synthetic; don't count it
    _ => format!(" Timeline ({}) ", rows.len().saturating_sub(1)),
  };

  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if rows.len() <= 1 && !app.projects().is_loading() {
    let content = if app.projects().is_error() {
      "Failed to load the project feed. Press 'r' to retry."
    } else {
      "No projects in the feed yet."
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = rows.iter().map(|row| timeline_item(row, app)).collect();

  let list = List::new(items).block(block).highlight_style(
    Style::default()
      .bg(Color::DarkGray)
      .add_modifier(Modifier::BOLD),
  );

  let mut state = ListState::default().with_selected(Some(app.state().selected));
  frame.render_stateful_widget(list, area, &mut state);
}

fn timeline_item<'a>(row: &'a TimelineRow, app: &App) -> ListItem<'a> {
  let mut lines: Vec<Line> = Vec::new();

  if let Some(label) = row.label {
    lines.push(Line::from(Span::styled(
      label.to_string(),
      Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD),
    )));
  }

  let project = &row.project;
  let date = if project.is_present_moment {
    portfolio::format_clock(app.now())
  } else {
    portfolio::format_date(project.date)
  };
  let marker = if project.is_present_moment { "◉" } else { "●" };

  lines.push(Line::from(vec![
    Span::styled(format!("{} ", marker), Style::default().fg(Color::Blue)),
    Span::styled(
      format!("[{}] ", project.project_type),
      Style::default().fg(type_color(&project.project_type)),
    ),
    Span::raw(truncate(&project.title, 48)),
    Span::styled(format!(", {}", date), Style::default().fg(Color::DarkGray)),
  ]));

  ListItem::new(lines)
}
