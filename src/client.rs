//! Client for the published portfolio site.
//!
//! All remote fetches go through the cache controller, so the feed and
//! its media keep working offline. Disabling the cache in config routes
//! requests straight to the network.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use tracing::warn;
use url::Url;

use crate::cache::{
  CacheController, CacheStatus, ControlMessage, ControlReply, ResponseSource, Served, SqliteStore,
};
use crate::config::Config;
use crate::portfolio::{self, Project};

#[derive(Clone)]
pub struct SiteClient {
  controller: Option<Arc<CacheController<SqliteStore>>>,
  http: reqwest::Client,
  data_url: Url,
  offline: bool,
}

impl SiteClient {
  pub fn new(config: &Config) -> Result<Self> {
    let origin = Url::parse(&config.site.origin)
      .map_err(|e| eyre!("Invalid site origin '{}': {}", config.site.origin, e))?;
    let data_url = origin
      .join(&config.site.data_path)
      .map_err(|e| eyre!("Invalid data path '{}': {}", config.site.data_path, e))?;

    let controller = if config.cache.enabled {
      let store = match &config.cache.dir {
        Some(dir) => SqliteStore::open_at(&dir.join("cache.db"))?,
        None => SqliteStore::open()?,
      };
      Some(Arc::new(CacheController::new(
        store,
        origin,
        config.cache.name.clone(),
      )))
    } else {
      None
    };

    Ok(Self {
      controller,
      http: reqwest::Client::new(),
      data_url,
      offline: config.cache.offline,
    })
  }

  /// Startup lifecycle: warm the static partition, then drop partitions
  /// from older cache versions. Failures never block startup.
  pub async fn start(&self) {
    let Some(controller) = &self.controller else {
      return;
    };
    if !self.offline {
      controller.install().await;
    }
    // Take over immediately, dropping partitions of older cache versions
    if let Err(error) = controller.handle_message(ControlMessage::SkipWaiting) {
      warn!(%error, "cache activation failed");
    }
  }

  /// Fetch the project feed and normalize it into canonical projects.
  pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
    let served = self.fetch(&self.data_url).await?;
    if !served.is_http_ok() {
      return Err(eyre!("Project feed request failed: HTTP {}", served.status));
    }

    let payload: serde_json::Value = serde_json::from_slice(&served.body)
      .map_err(|e| eyre!("Project feed is not valid JSON: {}", e))?;

    Ok(portfolio::normalize(&payload)?)
  }

  async fn fetch(&self, url: &Url) -> Result<Served> {
    match &self.controller {
      Some(controller) if self.offline => Ok(controller.handle_offline(url).await),
      Some(controller) => controller.handle(reqwest::Method::GET, url).await,
      None => {
        let response = self
          .http
          .get(url.clone())
          .send()
          .await
          .map_err(|e| eyre!("Network request failed for {}: {}", url, e))?;
        let status = response.status().as_u16();
        let content_type = response
          .headers()
          .get(reqwest::header::CONTENT_TYPE)
          .and_then(|value| value.to_str().ok())
          .map(String::from);
        let body = response
          .bytes()
          .await
          .map_err(|e| eyre!("Failed to read body for {}: {}", url, e))?
          .to_vec();
        Ok(Served {
          status,
          content_type,
          body,
          source: ResponseSource::Network,
        })
      }
    }
  }

  /// Answer the cache-status control message. `None` when the cache is
  /// disabled.
  pub fn cache_status(&self) -> Result<Option<CacheStatus>> {
    match &self.controller {
      Some(controller) => match controller.handle_message(ControlMessage::GetCacheStatus)? {
        ControlReply::Status(status) => Ok(Some(status)),
        ControlReply::Activated => Ok(None),
      },
      None => Ok(None),
    }
  }
}
