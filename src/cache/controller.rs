//! The cache controller: dispatches each outgoing request to one of the
//! five caching strategies and guarantees a usable response.
//!
//! Strategy bodies take the network fetch as an injected closure, so the
//! semantics are exercised in tests without a network. Each request is an
//! independent task; the only shared state is the store.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::policy::{classify, config_for, is_image_path, Partition, PartitionConfig, Strategy, STATIC_ASSETS};
use super::traits::{
  CacheStatus, CacheStore, PartitionStatus, ResponseSource, Served, StoredResponse,
};

/// Control messages from the hosting application: diagnostics and
/// immediate update activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
  GetCacheStatus,
  SkipWaiting,
}

#[derive(Debug, Clone)]
pub enum ControlReply {
  Status(CacheStatus),
  Activated,
}

pub struct CacheController<S: CacheStore> {
  store: Arc<S>,
  http: reqwest::Client,
  origin: Url,
  /// Versioned cache name, e.g. "folio-v1"; partitions append the class
  cache_name: String,
}

impl<S: CacheStore + 'static> CacheController<S> {
  pub fn new(store: S, origin: Url, cache_name: impl Into<String>) -> Self {
    Self {
      store: Arc::new(store),
      http: reqwest::Client::new(),
      origin,
      cache_name: cache_name.into(),
    }
  }

  fn partition_name(&self, partition: Partition) -> String {
    format!("{}-{}", self.cache_name, partition.as_str())
  }

  /// Handle one outgoing request.
  ///
  /// GETs over http(s) run through the classified strategy and always
  /// resolve to a response: a failed strategy falls back to stale cache,
  /// a placeholder, or a structured offline answer. Anything else passes
  /// straight to the network, untouched by the cache, and its errors
  /// propagate.
  pub async fn handle(&self, method: reqwest::Method, url: &Url) -> Result<Served> {
    if method != reqwest::Method::GET || !matches!(url.scheme(), "http" | "https") {
      // Never intercepted: straight to the network, uncached, and errors
      // propagate to the caller
      let fetcher = {
        let http = self.http.clone();
        let url = url.clone();
        move || request_via(http, method, url)
      };
      let config = config_for(Partition::Default);
      return self
        .execute(Strategy::NetworkOnly, "", url.as_str(), &config, fetcher)
        .await;
    }

    let config = classify(url, &self.origin);
    debug!(%url, partition = config.partition.as_str(), "dispatching request");

    let partition = self.partition_name(config.partition);
    let fetcher = {
      let http = self.http.clone();
      let url = url.clone();
      move || fetch_via(http, url)
    };

    match self
      .execute(config.strategy, &partition, url.as_str(), &config, fetcher)
      .await
    {
      Ok(served) => Ok(served),
      Err(error) => {
        warn!(%url, %error, "strategy failed, serving fallback");
        Ok(self.fallback(url))
      }
    }
  }

  /// Serve a GET from cache alone, for explicit offline mode. Classifies
  /// into the same partitions as `handle`, but never touches the network;
  /// misses resolve through the fallback chain.
  pub async fn handle_offline(&self, url: &Url) -> Served {
    let config = classify(url, &self.origin);
    let partition = self.partition_name(config.partition);

    let result = self
      .execute(
        Strategy::CacheOnly,
        &partition,
        url.as_str(),
        &config,
        || async { Err(eyre!("offline mode")) },
      )
      .await;

    match result {
      Ok(served) => served,
      Err(error) => {
        debug!(%url, %error, "offline miss, serving fallback");
        self.fallback(url)
      }
    }
  }

  /// Single strategy dispatch point.
  async fn execute<F, Fut>(
    &self,
    strategy: Strategy,
    partition: &str,
    url: &str,
    config: &PartitionConfig,
    fetcher: F,
  ) -> Result<Served>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<StoredResponse>> + Send,
  {
    match strategy {
      Strategy::CacheFirst => self.cache_first(partition, url, config, fetcher).await,
      Strategy::NetworkFirst => self.network_first(partition, url, config, fetcher).await,
      Strategy::StaleWhileRevalidate => {
        self
          .stale_while_revalidate(partition, url, config, fetcher)
          .await
      }
      Strategy::CacheOnly => self.cache_only(partition, url, config),
      Strategy::NetworkOnly => {
        let response = fetcher().await?;
        Ok(Served::from_stored(response, ResponseSource::Network))
      }
    }
  }

  /// Serve from cache while fresh; otherwise fetch and store. A dead
  /// network falls back to the cached entry even when expired.
  async fn cache_first<F, Fut>(
    &self,
    partition: &str,
    url: &str,
    config: &PartitionConfig,
    fetcher: F,
  ) -> Result<Served>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<StoredResponse>>,
  {
    let cached = self.store.get(partition, url)?;
    if let Some(response) = &cached {
      if !response.is_expired(config.max_age, Utc::now()) {
        return Ok(Served::from_stored(
          response.clone(),
          ResponseSource::CacheFresh,
        ));
      }
    }

    match fetcher().await {
      Ok(response) => {
        self.store_success(partition, url, &response, config);
        Ok(Served::from_stored(response, ResponseSource::Network))
      }
      Err(error) => match cached {
        Some(response) => Ok(Served::from_stored(response, ResponseSource::CacheStale)),
        None => Err(error),
      },
    }
  }

  /// Try the network; fall back to whatever the cache holds.
  async fn network_first<F, Fut>(
    &self,
    partition: &str,
    url: &str,
    config: &PartitionConfig,
    fetcher: F,
  ) -> Result<Served>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<StoredResponse>>,
  {
    match fetcher().await {
      Ok(response) => {
        self.store_success(partition, url, &response, config);
        Ok(Served::from_stored(response, ResponseSource::Network))
      }
      Err(error) => match self.store.get(partition, url)? {
        Some(response) => {
          let source = if response.is_expired(config.max_age, Utc::now()) {
            ResponseSource::CacheStale
          } else {
            ResponseSource::CacheFresh
          };
          Ok(Served::from_stored(response, source))
        }
        None => Err(error),
      },
    }
  }

  /// Serve the cached entry immediately, refreshing it in the background.
  /// The refresh is fire-and-forget; its failures are swallowed. With an
  /// empty cache this behaves like network-first.
  async fn stale_while_revalidate<F, Fut>(
    &self,
    partition: &str,
    url: &str,
    config: &PartitionConfig,
    fetcher: F,
  ) -> Result<Served>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<StoredResponse>> + Send,
  {
    match self.store.get(partition, url)? {
      Some(response) => {
        let store = Arc::clone(&self.store);
        let partition = partition.to_string();
        let url = url.to_string();
        let max_entries = config.max_entries;
        tokio::spawn(async move {
          match fetcher().await {
            Ok(fresh) if fresh.is_http_ok() => {
              if let Err(error) = store_and_trim(store.as_ref(), &partition, &url, &fresh, max_entries)
              {
                debug!(%url, %error, "background refresh store failed");
              }
            }
            Ok(_) => {}
            Err(error) => debug!(%url, %error, "background refresh failed"),
          }
        });

        let source = if response.is_expired(config.max_age, Utc::now()) {
          ResponseSource::CacheStale
        } else {
          ResponseSource::CacheFresh
        };
        Ok(Served::from_stored(response, source))
      }
      None => {
        let response = fetcher().await?;
        self.store_success(partition, url, &response, config);
        Ok(Served::from_stored(response, ResponseSource::Network))
      }
    }
  }

  /// Serve from cache; absence is a hard failure.
  fn cache_only(&self, partition: &str, url: &str, config: &PartitionConfig) -> Result<Served> {
    match self.store.get(partition, url)? {
      Some(response) => {
        let source = if response.is_expired(config.max_age, Utc::now()) {
          ResponseSource::CacheStale
        } else {
          ResponseSource::CacheFresh
        };
        Ok(Served::from_stored(response, source))
      }
      None => Err(eyre!("no cached response for {}", url)),
    }
  }

  /// Store an HTTP-ok response and apply the partition's FIFO cap.
  /// Storage failures are non-fatal; the response still goes out.
  fn store_success(
    &self,
    partition: &str,
    url: &str,
    response: &StoredResponse,
    config: &PartitionConfig,
  ) {
    if !response.is_http_ok() {
      return;
    }
    if let Err(error) =
      store_and_trim(self.store.as_ref(), partition, url, response, config.max_entries)
    {
      warn!(%url, %error, "failed to cache response");
    }
  }

  /// Last-resort responses when a strategy fails with nothing usable:
  /// the cached site root for documents, an inline placeholder for
  /// images, a structured offline answer for everything else.
  fn fallback(&self, url: &Url) -> Served {
    let path = url.path();

    if path == "/" || path.ends_with('/') || path.ends_with(".html") {
      let partition = self.partition_name(Partition::Static);
      for candidate in ["/", "/index.html"] {
        let Ok(joined) = self.origin.join(candidate) else {
          continue;
        };
        if let Ok(Some(response)) = self.store.get(&partition, joined.as_str()) {
          return Served::from_stored(response, ResponseSource::Fallback);
        }
      }
      return offline_response();
    }

    if is_image_path(path) {
      return placeholder_image();
    }

    offline_response()
  }

  /// Warm the static partition with the site shell. Individual failures
  /// are logged and skipped; install never fails the startup.
  pub async fn install(&self) {
    let config = config_for(Partition::Static);
    let partition = self.partition_name(Partition::Static);
    info!(count = STATIC_ASSETS.len(), "precaching site shell");

    let fetches = STATIC_ASSETS
      .iter()
      .filter_map(|path| self.origin.join(path).ok())
      .map(|url| {
        let http = self.http.clone();
        async move {
          let result = fetch_via(http, url.clone()).await;
          (url, result)
        }
      });

    for (url, result) in futures::future::join_all(fetches).await {
      match result {
        Ok(response) if response.is_http_ok() => {
          if let Err(error) =
            store_and_trim(self.store.as_ref(), &partition, url.as_str(), &response, config.max_entries)
          {
            warn!(%url, %error, "precache store failed");
          }
        }
        Ok(response) => warn!(%url, status = response.status, "precache skipped"),
        Err(error) => warn!(%url, %error, "precache fetch failed"),
      }
    }
  }

  /// Drop partitions left behind by older cache versions. Partitions of
  /// the current cache name are kept.
  pub fn activate(&self) -> Result<usize> {
    let app_prefix = match self.cache_name.split_once('-') {
      Some((app, _)) => format!("{}-", app),
      None => format!("{}-", self.cache_name),
    };
    let current_prefix = format!("{}-", self.cache_name);

    let mut removed = 0;
    for partition in self.store.partitions()? {
      if partition.starts_with(&app_prefix) && !partition.starts_with(&current_prefix) {
        info!(partition, "deleting old cache partition");
        self.store.delete_partition(&partition)?;
        removed += 1;
      }
    }
    Ok(removed)
  }

  /// Snapshot of every partition, for diagnostics.
  pub fn status(&self) -> Result<CacheStatus> {
    let mut partitions = Vec::new();
    for name in self.store.partitions()? {
      let urls = self.store.keys(&name)?;
      partitions.push(PartitionStatus {
        name,
        entries: urls.len(),
        urls,
      });
    }
    Ok(CacheStatus { partitions })
  }

  pub fn handle_message(&self, message: ControlMessage) -> Result<ControlReply> {
    match message {
      ControlMessage::GetCacheStatus => Ok(ControlReply::Status(self.status()?)),
      ControlMessage::SkipWaiting => {
        self.activate()?;
        Ok(ControlReply::Activated)
      }
    }
  }
}

fn store_and_trim<S: CacheStore + ?Sized>(
  store: &S,
  partition: &str,
  url: &str,
  response: &StoredResponse,
  max_entries: Option<usize>,
) -> Result<()> {
  store.put(partition, url, response)?;
  if let Some(cap) = max_entries {
    let evicted = store.trim_to(partition, cap)?;
    if evicted > 0 {
      debug!(partition, evicted, "evicted oldest cache entries");
    }
  }
  Ok(())
}

async fn fetch_via(http: reqwest::Client, url: Url) -> Result<StoredResponse> {
  request_via(http, reqwest::Method::GET, url).await
}

async fn request_via(
  http: reqwest::Client,
  method: reqwest::Method,
  url: Url,
) -> Result<StoredResponse> {
  let response = http
    .request(method, url.clone())
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

  Ok(StoredResponse {
    status,
    content_type,
    body,
    stored_at: Utc::now(),
  })
}

fn placeholder_image() -> Served {
  const PLACEHOLDER: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200"><rect width="200" height="200" fill="#f0f0f0"/><text x="100" y="100" text-anchor="middle" font-family="sans-serif" font-size="14" fill="#666">Image unavailable offline</text></svg>"##;
  Served {
    status: 200,
    content_type: Some("image/svg+xml".to_string()),
    body: PLACEHOLDER.as_bytes().to_vec(),
    source: ResponseSource::Fallback,
  }
}

fn offline_response() -> Served {
  let body = serde_json::json!({
    "error": "Offline",
    "message": "This content is not available offline",
  });
  Served {
    status: 503,
    content_type: Some("application/json".to_string()),
    body: body.to_string().into_bytes(),
    source: ResponseSource::Fallback,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::store::MemoryStore;
  use chrono::Duration;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn controller() -> CacheController<MemoryStore> {
    CacheController::new(
      MemoryStore::new(),
      Url::parse("https://folio.test").unwrap(),
      "folio-v1",
    )
  }

  fn response(body: &str) -> StoredResponse {
    StoredResponse {
      status: 200,
      content_type: Some("text/plain".to_string()),
      body: body.as_bytes().to_vec(),
      stored_at: Utc::now(),
    }
  }

  fn expired_response(body: &str) -> StoredResponse {
    StoredResponse {
      stored_at: Utc::now() - Duration::days(365),
      ..response(body)
    }
  }

  fn config(max_entries: Option<usize>) -> PartitionConfig {
    PartitionConfig {
      partition: Partition::Api,
      strategy: Strategy::NetworkFirst,
      max_age: Duration::minutes(5),
      max_entries,
    }
  }

  fn counting_fetcher(
    counter: Arc<AtomicUsize>,
    result: Result<StoredResponse>,
  ) -> impl FnOnce() -> std::future::Ready<Result<StoredResponse>> + Send + 'static {
    move || {
      counter.fetch_add(1, Ordering::SeqCst);
      std::future::ready(result)
    }
  }

  #[tokio::test]
  async fn test_cache_first_serves_fresh_cache_without_network() {
    let ctrl = controller();
    ctrl.store.put("p", "u", &response("cached")).unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let served = ctrl
      .cache_first("p", "u", &config(None), counting_fetcher(hits.clone(), Ok(response("net"))))
      .await
      .unwrap();

    assert_eq!(served.body, b"cached");
    assert_eq!(served.source, ResponseSource::CacheFresh);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_cache_first_expired_goes_to_network() {
    let ctrl = controller();
    ctrl.store.put("p", "u", &expired_response("old")).unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let served = ctrl
      .cache_first("p", "u", &config(None), counting_fetcher(hits.clone(), Ok(response("new"))))
      .await
      .unwrap();

    assert_eq!(served.body, b"new");
    assert_eq!(served.source, ResponseSource::Network);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    // The fresh response replaced the cache entry
    assert_eq!(ctrl.store.get("p", "u").unwrap().unwrap().body, b"new");
  }

  #[tokio::test]
  async fn test_cache_first_dead_network_serves_expired_entry() {
    let ctrl = controller();
    ctrl.store.put("p", "u", &expired_response("stale")).unwrap();

    let served = ctrl
      .cache_first("p", "u", &config(None), || {
        std::future::ready(Err(eyre!("connection refused")))
      })
      .await
      .unwrap();

    assert_eq!(served.body, b"stale");
    assert_eq!(served.source, ResponseSource::CacheStale);
  }

  #[tokio::test]
  async fn test_cache_first_empty_cache_dead_network_fails() {
    let ctrl = controller();
    let result = ctrl
      .cache_first("p", "u", &config(None), || {
        std::future::ready(Err(eyre!("connection refused")))
      })
      .await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_network_first_success_stores() {
    let ctrl = controller();
    let served = ctrl
      .network_first("p", "u", &config(None), || std::future::ready(Ok(response("fresh"))))
      .await
      .unwrap();

    assert_eq!(served.source, ResponseSource::Network);
    assert_eq!(ctrl.store.get("p", "u").unwrap().unwrap().body, b"fresh");
  }

  #[tokio::test]
  async fn test_network_first_failure_falls_back_to_cache() {
    let ctrl = controller();
    ctrl.store.put("p", "u", &response("held")).unwrap();

    let served = ctrl
      .network_first("p", "u", &config(None), || {
        std::future::ready(Err(eyre!("offline")))
      })
      .await
      .unwrap();

    assert_eq!(served.body, b"held");
    assert_eq!(served.source, ResponseSource::CacheFresh);
  }

  #[tokio::test]
  async fn test_network_first_failure_without_cache_is_an_error() {
    let ctrl = controller();
    let result = ctrl
      .network_first("p", "u", &config(None), || {
        std::future::ready(Err(eyre!("offline")))
      })
      .await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_non_ok_responses_are_returned_but_not_stored() {
    let ctrl = controller();
    let mut not_found = response("missing");
    not_found.status = 404;

    let served = ctrl
      .network_first("p", "u", &config(None), || std::future::ready(Ok(not_found)))
      .await
      .unwrap();

    assert_eq!(served.status, 404);
    assert!(ctrl.store.get("p", "u").unwrap().is_none());
  }

  #[tokio::test]
  async fn test_fifo_eviction_at_cap() {
    let ctrl = controller();
    let cfg = config(Some(2));

    for (url, body) in [("u1", "1"), ("u2", "2"), ("u3", "3")] {
      ctrl
        .cache_first("p", url, &cfg, || std::future::ready(Ok(response(body))))
        .await
        .unwrap();
    }

    // Oldest entry evicted once the third insertion exceeded the cap
    assert_eq!(ctrl.store.keys("p").unwrap(), vec!["u2", "u3"]);

    // A cache-first read of the evicted URL must hit the network again
    let hits = Arc::new(AtomicUsize::new(0));
    ctrl
      .cache_first("p", "u1", &cfg, counting_fetcher(hits.clone(), Ok(response("1 again"))))
      .await
      .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_swr_serves_cached_and_refreshes_in_background() {
    let ctrl = controller();
    ctrl.store.put("p", "u", &response("old")).unwrap();

    let served = ctrl
      .stale_while_revalidate("p", "u", &config(None), || {
        std::future::ready(Ok(response("refreshed")))
      })
      .await
      .unwrap();

    // The caller gets the cached entry immediately
    assert_eq!(served.body, b"old");

    // ...and the background task replaces it for next time
    let mut replaced = false;
    for _ in 0..50 {
      tokio::time::sleep(std::time::Duration::from_millis(5)).await;
      if ctrl.store.get("p", "u").unwrap().unwrap().body == b"refreshed" {
        replaced = true;
        break;
      }
    }
    assert!(replaced);
  }

  #[tokio::test]
  async fn test_swr_background_failure_is_swallowed() {
    let ctrl = controller();
    ctrl.store.put("p", "u", &response("kept")).unwrap();

    let served = ctrl
      .stale_while_revalidate("p", "u", &config(None), || {
        std::future::ready(Err(eyre!("offline")))
      })
      .await
      .unwrap();

    assert_eq!(served.body, b"kept");
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(ctrl.store.get("p", "u").unwrap().unwrap().body, b"kept");
  }

  #[tokio::test]
  async fn test_swr_empty_cache_waits_for_network() {
    let ctrl = controller();
    let served = ctrl
      .stale_while_revalidate("p", "u", &config(None), || {
        std::future::ready(Ok(response("first")))
      })
      .await
      .unwrap();

    assert_eq!(served.body, b"first");
    assert_eq!(served.source, ResponseSource::Network);
    assert_eq!(ctrl.store.get("p", "u").unwrap().unwrap().body, b"first");
  }

  #[tokio::test]
  async fn test_cache_only_absence_is_a_hard_failure() {
    let ctrl = controller();
    assert!(ctrl.cache_only("p", "u", &config(None)).is_err());

    ctrl.store.put("p", "u", &response("present")).unwrap();
    let served = ctrl.cache_only("p", "u", &config(None)).unwrap();
    assert_eq!(served.body, b"present");
  }

  #[tokio::test]
  async fn test_handle_offline_serves_cache_and_falls_back() {
    let ctrl = controller();
    let url = Url::parse("https://folio.test/data/projects.json").unwrap();
    ctrl
      .store
      .put("folio-v1-static", url.as_str(), &response("[]"))
      .unwrap();

    let served = ctrl.handle_offline(&url).await;
    assert_eq!(served.body, b"[]");

    // Nothing cached for this image, so the placeholder comes back
    let image = Url::parse("https://folio.test/shot.png").unwrap();
    let served = ctrl.handle_offline(&image).await;
    assert_eq!(served.source, ResponseSource::Fallback);
    assert_eq!(served.content_type.as_deref(), Some("image/svg+xml"));
  }

  #[tokio::test]
  async fn test_execute_dispatches_cache_only_without_network() {
    let ctrl = controller();
    ctrl.store.put("p", "u", &response("held")).unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let served = ctrl
      .execute(
        Strategy::CacheOnly,
        "p",
        "u",
        &config(None),
        counting_fetcher(hits.clone(), Ok(response("net"))),
      )
      .await
      .unwrap();

    assert_eq!(served.body, b"held");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn test_fallback_image_placeholder() {
    let ctrl = controller();
    let served = ctrl.fallback(&Url::parse("https://folio.test/pic.png").unwrap());
    assert_eq!(served.source, ResponseSource::Fallback);
    assert_eq!(served.content_type.as_deref(), Some("image/svg+xml"));
  }

  #[test]
  fn test_fallback_document_serves_cached_root() {
    let ctrl = controller();
    ctrl
      .store
      .put("folio-v1-static", "https://folio.test/", &response("<html>home</html>"))
      .unwrap();

    let served = ctrl.fallback(&Url::parse("https://folio.test/gallery/").unwrap());
    assert_eq!(served.body, b"<html>home</html>");
    assert_eq!(served.source, ResponseSource::Fallback);
  }

  #[test]
  fn test_fallback_offline_error_response() {
    let ctrl = controller();
    let served = ctrl.fallback(&Url::parse("https://folio.test/other").unwrap());
    assert_eq!(served.status, 503);
    let body: serde_json::Value = serde_json::from_slice(&served.body).unwrap();
    assert_eq!(body["error"], "Offline");
  }

  #[test]
  fn test_activate_prunes_only_old_versions() {
    let ctrl = controller();
    for partition in ["folio-v0-images", "folio-v1-images", "folio-v1-static", "unrelated"] {
      ctrl.store.put(partition, "u", &response("x")).unwrap();
    }

    let removed = ctrl.activate().unwrap();
    assert_eq!(removed, 1);
    assert_eq!(
      ctrl.store.partitions().unwrap(),
      vec!["folio-v1-images", "folio-v1-static", "unrelated"]
    );
  }

  #[test]
  fn test_skip_waiting_activates() {
    let ctrl = controller();
    ctrl.store.put("folio-v0-api", "u", &response("old")).unwrap();

    let reply = ctrl.handle_message(ControlMessage::SkipWaiting).unwrap();
    assert!(matches!(reply, ControlReply::Activated));
    assert!(ctrl.store.partitions().unwrap().is_empty());
  }

  #[test]
  fn test_status_reports_partitions() {
    let ctrl = controller();
    ctrl.store.put("folio-v1-api", "u1", &response("1")).unwrap();
    ctrl.store.put("folio-v1-api", "u2", &response("2")).unwrap();

    let reply = ctrl.handle_message(ControlMessage::GetCacheStatus).unwrap();
    let ControlReply::Status(status) = reply else {
      panic!("expected status reply");
    };
    assert_eq!(status.partitions.len(), 1);
    assert_eq!(status.partitions[0].entries, 2);
    assert_eq!(status.partitions[0].urls, vec!["u1", "u2"]);
  }
}
