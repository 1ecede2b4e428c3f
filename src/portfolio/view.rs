//! Pure ordering and formatting for the timeline and vault views.
//!
//! Everything here takes the wall clock as an explicit parameter and
//! returns fresh values; the renderer re-derives orderings on each draw.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeSet;
use std::fmt;

use super::types::{Project, PRESENT_MOMENT_ID};

/// The synthetic always-first timeline entry representing "now".
pub fn present_moment(now: NaiveDateTime) -> Project {
  Project {
    id: PRESENT_MOMENT_ID.to_string(),
    title: "Present Moment".to_string(),
    project_type: "now".to_string(),
    status: "ongoing".to_string(),
    description: String::new(),
    story: String::new(),
    date: Some(now.date()),
    links: Vec::new(),
    media: Vec::new(),
    tags: Vec::new(),
    medium: Vec::new(),
    extra: Vec::new(),
    is_present_moment: true,
  }
}

/// Timeline display order: present moment, then dated entries newest
/// first, then undated entries by title.
pub fn timeline_order(projects: &[Project], now: NaiveDateTime) -> Vec<Project> {
  let mut ordered = Vec::with_capacity(projects.len() + 1);
  ordered.push(present_moment(now));
  ordered.extend(dated_then_undated(projects));
  ordered
}

/// Vault display order: same dated/undated rule, filtered by the search
/// query and the active type set (empty set = show all).
pub fn grid_order(
  projects: &[Project],
  active_types: &BTreeSet<String>,
  query: &str,
) -> Vec<Project> {
  let query = query.trim().to_lowercase();
  dated_then_undated(projects)
    .into_iter()
    .filter(|project| matches_query(project, &query))
    .filter(|project| active_types.is_empty() || active_types.contains(&project.project_type))
    .collect()
}

fn dated_then_undated(projects: &[Project]) -> Vec<Project> {
  let mut dated: Vec<Project> = projects.iter().filter(|p| p.date.is_some()).cloned().collect();
  dated.sort_by(|a, b| b.date.cmp(&a.date));

  let mut undated: Vec<Project> = projects.iter().filter(|p| p.date.is_none()).cloned().collect();
  undated.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

  dated.extend(undated);
  dated
}

fn matches_query(project: &Project, query: &str) -> bool {
  if query.is_empty() {
    return true;
  }
  project.title.to_lowercase().contains(query)
    || project.description.to_lowercase().contains(query)
    || project.project_type.to_lowercase().contains(query)
    || project
      .medium
      .iter()
      .any(|m| m.to_lowercase().contains(query))
}

/// Year-group marker emitted when the timeline crosses into a new year
/// (or into the undated tail).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearLabel {
  Year(i32),
  Undated,
}

impl fmt::Display for YearLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      YearLabel::Year(year) => write!(f, "{}", year),
      YearLabel::Undated => write!(f, "Undated"),
    }
  }
}

/// One timeline row: the project plus the group label that precedes it,
/// if this row starts a new group.
#[derive(Debug, Clone)]
pub struct TimelineRow {
  pub label: Option<YearLabel>,
  pub project: Project,
}

/// Derive year-group breaks by scanning the ordered list. The
/// present-moment entry neither triggers nor belongs to a group.
pub fn timeline_rows(ordered: Vec<Project>) -> Vec<TimelineRow> {
  let mut rows = Vec::with_capacity(ordered.len());
  let mut last: Option<YearLabel> = None;

  for project in ordered {
    let label = if project.is_present_moment {
      None
    } else {
      let current = match project.date {
        Some(date) => YearLabel::Year(date.year()),
        None => YearLabel::Undated,
      };
      if last == Some(current) {
        None
      } else {
        last = Some(current);
        Some(current)
      }
    };
    rows.push(TimelineRow { label, project });
  }

  rows
}

/// Distinct project types in first-seen order, for the filter menu.
pub fn unique_types(projects: &[Project]) -> Vec<String> {
  let mut types: Vec<String> = Vec::new();
  for project in projects {
    if !project.project_type.is_empty() && !types.contains(&project.project_type) {
      types.push(project.project_type.clone());
    }
  }
  types
}

/// "January 2nd, 2023", or "Undated".
pub fn format_date(date: Option<NaiveDate>) -> String {
  match date {
    Some(date) => format!(
      "{} {}{}, {}",
      date.format("%B"),
      date.day(),
      ordinal(date.day()),
      date.year()
    ),
    None => "Undated".to_string(),
  }
}

/// The live present-moment clock: "January 2nd, 2023 3:04 PM".
pub fn format_clock(now: NaiveDateTime) -> String {
  let hour = now.hour();
  let (display_hour, meridiem) = match hour {
    0 => (12, "AM"),
    1..=11 => (hour, "AM"),
    12 => (12, "PM"),
    _ => (hour - 12, "PM"),
  };
  format!(
    "{} {}:{:02} {}",
    format_date(Some(now.date())),
    display_hour,
    now.minute(),
    meridiem
  )
}

fn ordinal(day: u32) -> &'static str {
  if (4..=20).contains(&day) {
    return "th";
  }
  match day % 10 {
    1 => "st",
    2 => "nd",
    3 => "rd",
    _ => "th",
  }
}
