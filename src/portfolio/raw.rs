//! Conversion from raw feed records to canonical [`Project`] values.
//!
//! The feed is exported from a spreadsheet and has gone through several
//! schema generations, so the same logical field can arrive in multiple
//! shapes (notably the link fields). A malformed field degrades to its
//! default; a record that is not a JSON object is dropped. Only the
//! top-level payload shape can fail the batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::types::{Link, MediaItem, MediaKind, Project};

/// Keys consumed into typed `Project` fields. Everything else is kept as a
/// display string in `Project::extra`.
const CONSUMED_KEYS: &[&str] = &[
  "id",
  "title",
  "type",
  "status",
  "description",
  "story",
  "date",
  "links",
  "media",
  "image_urls",
  "video_urls",
  "audio_urls",
  "external_link_names",
  "external_link_urls",
  "tags",
  "medium",
];

/// The feed payload itself was unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataFormatError {
  #[error("project feed is not a JSON array")]
  NotAnArray,
  #[error("project feed is empty")]
  Empty,
}

/// Convert the fetched payload into canonical projects.
pub fn normalize(payload: &Value) -> Result<Vec<Project>, DataFormatError> {
  let list = payload.as_array().ok_or(DataFormatError::NotAnArray)?;
  if list.is_empty() {
    return Err(DataFormatError::Empty);
  }

  Ok(
    list
      .iter()
      .filter_map(Value::as_object)
      .map(project_from_record)
      .collect(),
  )
}

fn project_from_record(record: &Map<String, Value>) -> Project {
  let id = non_empty_string(record.get("id")).unwrap_or_else(|| default_id(record));
  let title =
    non_empty_string(record.get("title")).unwrap_or_else(|| "Untitled Project".to_string());
  let project_type = non_empty_string(record.get("type")).unwrap_or_else(|| "misc".to_string());

  let extra = record
    .iter()
    .filter(|(key, _)| !CONSUMED_KEYS.contains(&key.as_str()))
    .map(|(key, value)| (key.clone(), display_value(value)))
    .filter(|(_, value)| !value.is_empty())
    .collect();

  Project {
    id,
    title,
    project_type,
    status: string_field(record.get("status")),
    description: string_field(record.get("description")),
    story: string_field(record.get("story")),
    date: record
      .get("date")
      .and_then(Value::as_str)
      .and_then(parse_date),
    links: LinkSource::detect(record)
      .map(LinkSource::resolve)
      .unwrap_or_default(),
    media: collect_media(record),
    tags: record.get("tags").map(|v| split_list(v, ';')).unwrap_or_default(),
    medium: record
      .get("medium")
      .map(|v| split_list(v, ';'))
      .unwrap_or_default(),
    extra,
    is_present_moment: false,
  }
}

/// Stable id token for records that lack one, from a digest of the record
/// itself.
fn default_id(record: &Map<String, Value>) -> String {
  let serialized = serde_json::to_string(record).unwrap_or_default();
  let mut hasher = Sha256::new();
  hasher.update(serialized.as_bytes());
  let digest = hex::encode(hasher.finalize());
  format!("proj-{}", &digest[..8])
}

/// Date formats the sheet exporter has produced over time, most recent
/// first, then full date-times.
fn parse_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  // Two-digit years go first so "6/1/24" is 2024, not year 24
  for format in ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"] {
    if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
      return Some(date);
    }
  }
  if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
    return Some(datetime.date_naive());
  }
  NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
    .ok()
    .map(|dt| dt.date())
}

// ============================================================================
// Link reconciliation
// ============================================================================

/// The two shapes link data arrives in: the current `links` list, or the
/// legacy `external_link_names` / `external_link_urls` pair. Both resolve
/// through the same pairing routine.
enum LinkSource<'a> {
  Structured(&'a [Value]),
  LegacyPair { names: &'a Value, urls: &'a Value },
}

impl<'a> LinkSource<'a> {
  fn detect(record: &'a Map<String, Value>) -> Option<Self> {
    if let Some(Value::Array(list)) = record.get("links") {
      return Some(LinkSource::Structured(list));
    }
    match (
      record.get("external_link_names"),
      record.get("external_link_urls"),
    ) {
      (Some(names), Some(urls)) => Some(LinkSource::LegacyPair { names, urls }),
      _ => None,
    }
  }

  fn resolve(self) -> Vec<Link> {
    let pairs: Vec<(Option<String>, Option<String>)> = match self {
      LinkSource::Structured(list) => list.iter().map(structured_pair).collect(),
      LinkSource::LegacyPair { names, urls } => {
        let names = legacy_names(names);
        let urls = legacy_urls(urls);
        (0..names.len().max(urls.len()))
          .map(|i| {
            let url = urls.get(i).cloned();
            // Missing name falls back to the paired url, then "Link"
            let name = names
              .get(i)
              .cloned()
              .filter(|n| !n.is_empty())
              .or_else(|| url.clone().filter(|u| !u.is_empty()))
              .or_else(|| Some("Link".to_string()));
            (name, url)
          })
          .collect()
      }
    };

    pairs.into_iter().filter_map(finish_link).collect()
  }
}

/// One `links` list entry as a (name, url) candidate pair.
fn structured_pair(entry: &Value) -> (Option<String>, Option<String>) {
  match entry {
    Value::String(s) => match s.split_once('|') {
      Some((name, url)) => {
        let name = if name.is_empty() { url } else { name };
        (Some(name.to_string()), Some(url.to_string()))
      }
      // A bare string is both the label and the target
      None => (Some(s.clone()), Some(s.clone())),
    },
    Value::Object(obj) => {
      let url = obj.get("url").and_then(Value::as_str).map(String::from);
      let name = obj
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .or_else(|| url.clone())
        .or_else(|| Some("Link".to_string()));
      (name, url)
    }
    _ => (None, None),
  }
}

/// Parse the legacy names field. A string splits on `|` when present,
/// otherwise on `,`; empty positions are kept so pairing stays positional.
fn legacy_names(value: &Value) -> Vec<String> {
  match value {
    Value::Array(items) => items.iter().map(display_value).collect(),
    Value::String(s) => split_delimited(s),
    _ => Vec::new(),
  }
}

/// Parse the legacy urls field. Array elements may themselves be `|`-joined
/// and are flattened before pairing.
fn legacy_urls(value: &Value) -> Vec<String> {
  match value {
    Value::Array(items) => {
      let mut urls = Vec::new();
      for item in items {
        match item.as_str() {
          Some(s) if s.contains('|') => {
            urls.extend(s.split('|').map(|u| u.trim().to_string()));
          }
          _ => urls.push(display_value(item)),
        }
      }
      urls
    }
    Value::String(s) => split_delimited(s),
    _ => Vec::new(),
  }
}

fn split_delimited(s: &str) -> Vec<String> {
  let sep = if s.contains('|') { '|' } else { ',' };
  s.split(sep).map(|part| part.trim().to_string()).collect()
}

/// Apply the shared terminal rules to one candidate pair: a missing or
/// placeholder url drops the link, the name falls back to the url, and
/// schemeless urls get an `https://` prefix.
fn finish_link(pair: (Option<String>, Option<String>)) -> Option<Link> {
  let (name, url) = pair;
  let url = url
    .map(|u| u.trim().to_string())
    .filter(|u| !u.is_empty())
    .unwrap_or_else(|| "#".to_string());
  if url == "#" {
    return None;
  }

  let name = name
    .map(|n| n.trim().to_string())
    .filter(|n| !n.is_empty())
    .unwrap_or_else(|| url.clone());
  let url = if url.starts_with("http") {
    url
  } else {
    format!("https://{}", url)
  };

  Some(Link { name, url })
}

// ============================================================================
// Media
// ============================================================================

/// Gather media URLs. The unified `media` key wins; otherwise the per-kind
/// url lists from the older exporter are concatenated.
fn collect_media(record: &Map<String, Value>) -> Vec<MediaItem> {
  let urls: Vec<String> = if let Some(media) = record.get("media") {
    match media {
      Value::Array(items) => items.iter().map(display_value).collect(),
      Value::String(s) => vec![s.clone()],
      _ => Vec::new(),
    }
  } else {
    ["image_urls", "video_urls", "audio_urls"]
      .iter()
      .filter_map(|key| record.get(*key))
      .flat_map(|value| split_list(value, ','))
      .collect()
  };

  urls
    .into_iter()
    .map(|url| url.trim().to_string())
    .filter(|url| !url.is_empty())
    .map(|url| MediaItem {
      kind: MediaKind::classify(&url),
      url,
    })
    .collect()
}

// ============================================================================
// Value coercion helpers
// ============================================================================

/// Scalar coerced to a non-empty string; sheet exports sometimes produce
/// bare numbers for id-like columns.
fn non_empty_string(value: Option<&Value>) -> Option<String> {
  let s = match value? {
    Value::String(s) => s.trim().to_string(),
    Value::Number(n) => n.to_string(),
    _ => return None,
  };
  if s.is_empty() {
    None
  } else {
    Some(s)
  }
}

fn string_field(value: Option<&Value>) -> String {
  value.map(display_value).unwrap_or_default()
}

/// Render an arbitrary value for display. Scalars stringify, arrays join
/// with ", ", objects fall back to compact JSON.
fn display_value(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    Value::Array(items) => items
      .iter()
      .map(display_value)
      .collect::<Vec<_>>()
      .join(", "),
    Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
  }
}

/// A list-ish field: arrays stringify per element, strings split on `sep`.
fn split_list(value: &Value, sep: char) -> Vec<String> {
  match value {
    Value::Array(items) => items
      .iter()
      .map(display_value)
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect(),
    Value::String(s) => s
      .split(sep)
      .map(|part| part.trim().to_string())
      .filter(|part| !part.is_empty())
      .collect(),
    _ => Vec::new(),
  }
}
