//! Request classification: which partition, strategy, and limits govern a
//! given URL. Classification is deterministic and stateless; the first
//! matching rule wins.

use chrono::Duration;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Resource classes. Each maps to its own cache partition named
/// `<cache-name>-<class>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
  Static,
  Images,
  Api,
  External,
  Default,
}

impl Partition {
  pub fn as_str(&self) -> &'static str {
    match self {
      Partition::Static => "static",
      Partition::Images => "images",
      Partition::Api => "api",
      Partition::External => "external",
      Partition::Default => "default",
    }
  }
}

/// The five caching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  CacheFirst,
  NetworkFirst,
  StaleWhileRevalidate,
  CacheOnly,
  NetworkOnly,
}

/// Strategy plus limits for one partition.
#[derive(Debug, Clone, Copy)]
pub struct PartitionConfig {
  pub partition: Partition,
  pub strategy: Strategy,
  pub max_age: Duration,
  /// FIFO eviction cap; `None` = uncapped
  pub max_entries: Option<usize>,
}

/// Site shell paths precached at install time and classified as static.
pub const STATIC_ASSETS: &[&str] = &[
  "/",
  "/index.html",
  "/styles/main.css",
  "/styles/animations.css",
  "/scripts/app.js",
  "/scripts/animations.js",
  "/data/projects.json",
  "/assets/favicon.ico",
];

/// The configuration each resource class runs under.
pub fn config_for(partition: Partition) -> PartitionConfig {
  match partition {
    Partition::Static => PartitionConfig {
      partition,
      strategy: Strategy::CacheFirst,
      max_age: Duration::days(7),
      max_entries: Some(50),
    },
    Partition::Images => PartitionConfig {
      partition,
      strategy: Strategy::CacheFirst,
      max_age: Duration::days(30),
      max_entries: Some(100),
    },
    Partition::Api => PartitionConfig {
      partition,
      strategy: Strategy::NetworkFirst,
      max_age: Duration::minutes(5),
      max_entries: Some(20),
    },
    Partition::External => PartitionConfig {
      partition,
      strategy: Strategy::StaleWhileRevalidate,
      max_age: Duration::days(1),
      max_entries: Some(30),
    },
    Partition::Default => PartitionConfig {
      partition,
      strategy: Strategy::NetworkFirst,
      max_age: Duration::hours(1),
      max_entries: None,
    },
  }
}

/// Classify a request URL against the page origin. First match wins:
/// static shell, images, API/data, cross-origin, default.
pub fn classify(url: &Url, origin: &Url) -> PartitionConfig {
  let path = url.path();

  if is_static_asset(path) {
    return config_for(Partition::Static);
  }
  if is_image_path(path) {
    return config_for(Partition::Images);
  }
  if path.contains("/api/") || path.contains("/data/") {
    return config_for(Partition::Api);
  }
  if url.origin() != origin.origin() {
    return config_for(Partition::External);
  }
  config_for(Partition::Default)
}

/// A path counts as a static asset when it matches an enumerated shell
/// path exactly, or shares its file name.
fn is_static_asset(path: &str) -> bool {
  STATIC_ASSETS.iter().any(|asset| {
    if *asset == "/" {
      return path == "/";
    }
    if path == *asset {
      return true;
    }
    match asset.rsplit('/').next() {
      Some(name) if !name.is_empty() => path.ends_with(&format!("/{}", name)),
      _ => false,
    }
  })
}

pub(crate) fn is_image_path(path: &str) -> bool {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)\.(jpe?g|png|gif|webp|svg)$").expect("valid regex"))
    .is_match(path)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn origin() -> Url {
    Url::parse("https://folio.test").unwrap()
  }

  fn classify_str(url: &str) -> PartitionConfig {
    classify(&Url::parse(url).unwrap(), &origin())
  }

  #[test]
  fn test_static_shell_paths() {
    let config = classify_str("https://folio.test/index.html");
    assert_eq!(config.partition, Partition::Static);
    assert_eq!(config.strategy, Strategy::CacheFirst);
    assert_eq!(config.max_entries, Some(50));

    assert_eq!(
      classify_str("https://folio.test/").partition,
      Partition::Static
    );
    // Same file name under a different directory still counts
    assert_eq!(
      classify_str("https://folio.test/v2/scripts/app.js").partition,
      Partition::Static
    );
  }

  #[test]
  fn test_image_extensions() {
    let config = classify_str("https://folio.test/assets/shot.PNG");
    assert_eq!(config.partition, Partition::Images);
    assert_eq!(config.strategy, Strategy::CacheFirst);
    assert_eq!(config.max_age, Duration::days(30));
  }

  #[test]
  fn test_image_rule_beats_cross_origin() {
    // Pattern rules run on the path before the origin check
    let config = classify_str("https://cdn.elsewhere.test/pic.jpg");
    assert_eq!(config.partition, Partition::Images);
  }

  #[test]
  fn test_api_and_data_paths() {
    assert_eq!(
      classify_str("https://folio.test/api/v1/things").partition,
      Partition::Api
    );
    let config = classify_str("https://folio.test/data/archive.json");
    assert_eq!(config.partition, Partition::Api);
    assert_eq!(config.strategy, Strategy::NetworkFirst);
    assert_eq!(config.max_age, Duration::minutes(5));
  }

  #[test]
  fn test_data_projects_json_is_static() {
    // The exact feed path is part of the precached shell; the static rule
    // wins over the /data/ rule
    assert_eq!(
      classify_str("https://folio.test/data/projects.json").partition,
      Partition::Static
    );
  }

  #[test]
  fn test_cross_origin_is_external() {
    let config = classify_str("https://fonts.elsewhere.test/face");
    assert_eq!(config.partition, Partition::External);
    assert_eq!(config.strategy, Strategy::StaleWhileRevalidate);
    assert_eq!(config.max_entries, Some(30));
  }

  #[test]
  fn test_same_origin_default() {
    let config = classify_str("https://folio.test/about");
    assert_eq!(config.partition, Partition::Default);
    assert_eq!(config.strategy, Strategy::NetworkFirst);
    assert_eq!(config.max_entries, None);
    assert_eq!(config.max_age, Duration::hours(1));
  }

  #[test]
  fn test_similar_file_name_is_not_static() {
    assert_eq!(
      classify_str("https://folio.test/not-app.js").partition,
      Partition::Default
    );
  }
}
