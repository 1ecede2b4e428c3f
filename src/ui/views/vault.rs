//! Vault view: the filterable card grid.

use crate::app::App;
use crate::portfolio;
use crate::query::QueryState;
use crate::ui::renderfns::{truncate, type_color};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

const CARD_WIDTH: u16 = 32;
const CARD_HEIGHT: u16 = 5;

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Filter / search summary
      Constraint::Min(1),    // Card grid
    ])
    .split(area);

  draw_controls(frame, chunks[0], app);
  draw_grid(frame, chunks[1], app);
}

fn draw_controls(frame: &mut Frame, area: Rect, app: &App) {
  let state = app.state();

  let types = if state.filter_types.is_empty() {
    "All Types".to_string()
  } else if state.filter_types.len() == 1 {
    state.filter_types.iter().next().cloned().unwrap_or_default()
  } else {
    format!("{} selected", state.filter_types.len())
  };

  let mut spans = vec![
    Span::styled(" Types: ", Style::default().fg(Color::DarkGray)),
    Span::raw(types),
  ];
  if !state.search.is_empty() {
    spans.push(Span::styled("   Search: ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      state.search.clone(),
      Style::default().fg(Color::Cyan),
    ));
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_grid(frame: &mut Frame, area: Rect, app: &App) {
  let projects = app.visible_projects();

  if projects.is_empty() {
    let content = match app.projects().state() {
      QueryState::Loading => "Loading projects...".to_string(),
      QueryState::Error(e) => format!(
        "Failed to load the project feed: {}. Press 'r' to retry.",
        truncate(e, 60)
      ),
      _ => "Nothing matches the current search and filters.".to_string(),
    };
    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let cols = ((area.width / CARD_WIDTH).max(1)) as usize;
  let visible_rows = ((area.height / CARD_HEIGHT).max(1)) as usize;

  // Scroll whole rows so the selection stays visible
  let selected_row = app.state().selected / cols;
  let first_row = selected_row.saturating_sub(visible_rows.saturating_sub(1));
  let first_index = first_row * cols;

  for (offset, project) in projects
    .iter()
    .enumerate()
    .skip(first_index)
    .take(cols * visible_rows)
    .map(|(i, p)| (i - first_index, p))
  {
    let col = (offset % cols) as u16;
    let row = (offset / cols) as u16;

    let x = area.x + col * CARD_WIDTH;
    let y = area.y + row * CARD_HEIGHT;
    let width = CARD_WIDTH.min(area.right().saturating_sub(x));
    let height = CARD_HEIGHT.min(area.bottom().saturating_sub(y));
    if width < 4 || height < 3 {
      continue;
    }
    let cell = Rect::new(x, y, width, height);

    let selected = offset + first_index == app.state().selected;
    draw_card(frame, cell, project, selected);
  }
}

fn draw_card(frame: &mut Frame, cell: Rect, project: &portfolio::Project, selected: bool) {
  let border_style = if selected {
    Style::default().fg(Color::Yellow)
  } else {
    Style::default().fg(Color::DarkGray)
  };
  let block = Block::default().borders(Borders::ALL).border_style(border_style);
  let inner = block.inner(cell);
  frame.render_widget(block, cell);

  let width = inner.width as usize;
  let has_image = project
    .media
    .first()
    .map(|m| m.kind == portfolio::MediaKind::Image)
    .unwrap_or(false);

  let type_line = Line::from(vec![
    Span::styled(
      format!("[{}]", truncate(&project.project_type, width.saturating_sub(2))),
      Style::default().fg(type_color(&project.project_type)),
    ),
    Span::styled(
      if has_image { " ▣" } else { "" }.to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  ]);

  let lines = vec![
    type_line,
    Line::from(Span::styled(
      truncate(&project.title, width),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(
      truncate(&portfolio::format_date(project.date), width),
      Style::default().fg(Color::DarkGray),
    )),
  ];

  frame.render_widget(Paragraph::new(lines), inner);
}

/// Checkbox menu for the type filter, drawn while filter mode is active.
pub fn draw_filter_menu(frame: &mut Frame, area: Rect, app: &App) {
  let types = app.available_types();
  let state = app.state();

  let height = (types.len() as u16 + 3).min(area.height.saturating_sub(1));
  let width = 30.min(area.width.saturating_sub(1));
  let overlay = Rect::new(area.x + 1, area.y + 1, width, height);
  frame.render_widget(Clear, overlay);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(" Filter Types ");

  let mut items: Vec<ListItem> = Vec::new();
  let all_checked = if state.filter_types.is_empty() { "x" } else { " " };
  items.push(ListItem::new(format!("[{}] All", all_checked)));
  for kind in &types {
    let checked = if state.filter_types.contains(kind) { "x" } else { " " };
    items.push(ListItem::new(format!("[{}] {}", checked, kind)));
  }

  let list = List::new(items).block(block).highlight_style(
    Style::default()
      .bg(Color::DarkGray)
      .add_modifier(Modifier::BOLD),
  );

  let mut list_state = ListState::default().with_selected(Some(state.filter_cursor));
  frame.render_stateful_widget(list, overlay, &mut list_state);
}
