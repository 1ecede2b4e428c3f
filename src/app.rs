//! Application state and event loop.

use crate::cache::CacheStatus;
use crate::client::SiteClient;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::portfolio::{self, Project, TimelineRow};
use crate::query::Query;
use crate::ui;
use chrono::{Local, NaiveDateTime};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::collections::BTreeSet;
use std::io::stdout;
use std::time::Duration;
use tracing::warn;

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Search,
  Filter,
}

/// Which presentation fills the content area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
  Timeline,
  Vault,
}

/// View state for one render.
///
/// The draw functions receive this immutably; all interaction funnels
/// through `App::handle_key`, so a render never observes a half-updated
/// view.
#[derive(Debug, Clone)]
pub struct ViewState {
  pub view: ViewMode,
  pub selected: usize,
  /// Whether the selected card is expanded into the detail overlay
  pub expanded: bool,
  pub search: String,
  pub filter_types: BTreeSet<String>,
  /// Cursor in the filter menu while it is open; 0 = "All"
  pub filter_cursor: usize,
}

impl Default for ViewState {
  fn default() -> Self {
    Self {
      view: ViewMode::Timeline,
      selected: 0,
      expanded: false,
      search: String::new(),
      filter_types: BTreeSet::new(),
      filter_cursor: 0,
    }
  }
}

/// Main application state
pub struct App {
  config: Config,
  client: SiteClient,
  projects: Query<Vec<Project>>,
  state: ViewState,
  mode: Mode,
  /// Cache-status overlay contents while it is open
  cache_overlay: Option<CacheStatus>,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, client: SiteClient) -> Self {
    let fetch_client = client.clone();
    let mut projects = Query::new(move || {
      let client = fetch_client.clone();
      async move { client.fetch_projects().await.map_err(|e| e.to_string()) }
    });
    projects.fetch();

    Self {
      config,
      client,
      projects,
      state: ViewState::default(),
      mode: Mode::Normal,
      cache_overlay: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    let mut events = EventHandler::new(Duration::from_millis(250));

    loop {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => {
          self.projects.poll();
        }
        Some(Event::Resize) => {}
        None => break,
      }

      if self.should_quit {
        break;
      }
    }

    Ok(())
  }

  // ==========================================================================
  // Accessors for the draw functions
  // ==========================================================================

  pub fn state(&self) -> &ViewState {
    &self.state
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn title(&self) -> &str {
    self.config.display_title()
  }

  pub fn projects(&self) -> &Query<Vec<Project>> {
    &self.projects
  }

  pub fn cache_overlay(&self) -> Option<&CacheStatus> {
    self.cache_overlay.as_ref()
  }

  pub fn now(&self) -> NaiveDateTime {
    Local::now().naive_local()
  }

  /// Projects in display order for the current view. Recomputed per call;
  /// the ordering functions are cheap and pure.
  pub fn visible_projects(&self) -> Vec<Project> {
    let data = self.projects.data().cloned().unwrap_or_default();
    match self.state.view {
      ViewMode::Timeline => portfolio::timeline_order(&data, self.now()),
      ViewMode::Vault => {
        portfolio::grid_order(&data, &self.state.filter_types, &self.state.search)
      }
    }
  }

  pub fn timeline_rows(&self) -> Vec<TimelineRow> {
    portfolio::timeline_rows(self.visible_projects())
  }

  pub fn selected_project(&self) -> Option<Project> {
    self.visible_projects().get(self.state.selected).cloned()
  }

  /// Distinct project types for the filter menu, from the unfiltered data.
  pub fn available_types(&self) -> Vec<String> {
    portfolio::unique_types(self.projects.data().map(Vec::as_slice).unwrap_or(&[]))
  }

  // ==========================================================================
  // Input handling
  // ==========================================================================

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.mode {
      Mode::Normal => self.handle_normal_key(key),
      Mode::Search => self.handle_search_key(key),
      Mode::Filter => self.handle_filter_key(key),
    }
  }

  fn handle_normal_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Tab | KeyCode::Char('v') => self.toggle_view(),
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::Enter => {
        // The present-moment entry has no expandable content
        if let Some(project) = self.selected_project() {
          if !project.is_present_moment {
            self.state.expanded = true;
          }
        }
      }
      KeyCode::Esc => {
        self.state.expanded = false;
        self.cache_overlay = None;
      }
      KeyCode::Char('/') => {
        self.mode = Mode::Search;
        self.state.expanded = false;
      }
      KeyCode::Char('f') => {
        if self.state.view == ViewMode::Vault {
          self.mode = Mode::Filter;
          self.state.filter_cursor = 0;
          self.state.expanded = false;
        }
      }
      KeyCode::Char('r') => self.projects.refetch(),
      KeyCode::Char('c') => self.toggle_cache_overlay(),
      _ => {}
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.state.search.clear();
        self.state.selected = 0;
        self.mode = Mode::Normal;
      }
      KeyCode::Enter => self.mode = Mode::Normal,
      KeyCode::Backspace => {
        self.state.search.pop();
        self.state.selected = 0;
      }
      KeyCode::Char(c) => {
        self.state.search.push(c);
        self.state.selected = 0;
      }
      _ => {}
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    let options = self.available_types().len() + 1; // "All" plus each type

    match key.code {
      KeyCode::Esc | KeyCode::Enter | KeyCode::Char('f') => self.mode = Mode::Normal,
      KeyCode::Char('j') | KeyCode::Down => {
        self.state.filter_cursor = (self.state.filter_cursor + 1) % options;
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.state.filter_cursor = (self.state.filter_cursor + options - 1) % options;
      }
      KeyCode::Char('a') => {
        self.state.filter_types.clear();
        self.state.selected = 0;
      }
      KeyCode::Char(' ') => {
        if self.state.filter_cursor == 0 {
          self.state.filter_types.clear();
        } else if let Some(kind) = self.available_types().get(self.state.filter_cursor - 1) {
          if !self.state.filter_types.remove(kind) {
            self.state.filter_types.insert(kind.clone());
          }
        }
        self.state.selected = 0;
      }
      _ => {}
    }
  }

  fn toggle_view(&mut self) {
    self.state.view = match self.state.view {
      ViewMode::Timeline => ViewMode::Vault,
      ViewMode::Vault => ViewMode::Timeline,
    };
    self.state.selected = 0;
    self.state.expanded = false;
  }

  fn move_selection(&mut self, delta: isize) {
    let len = self.visible_projects().len();
    if len == 0 {
      self.state.selected = 0;
      return;
    }
    let current = self.state.selected as isize;
    let next = (current + delta).clamp(0, len as isize - 1);
    self.state.selected = next as usize;
  }

  fn toggle_cache_overlay(&mut self) {
    if self.cache_overlay.is_some() {
      self.cache_overlay = None;
      return;
    }
    match self.client.cache_status() {
      Ok(Some(status)) => self.cache_overlay = Some(status),
      Ok(None) => self.cache_overlay = Some(CacheStatus { partitions: Vec::new() }),
      Err(error) => warn!(%error, "cache status unavailable"),
    }
  }
}
