//! RPC transport selection with failure cooldown.
//!
//! [`TransportResolver`] picks the endpoint to use for a chain.  The first
//! listed transport is preferred; a transport that failed within the
//! cooldown window is skipped in favour of the next one.  When every
//! transport is cooling down, selection wraps back to the first.
//!
//! Failure marks live only in memory and are shared behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use url::Url;

use wl_domain::error::{Error, Result};
use wl_domain::trace::TraceEvent;
use wl_domain::ChainId;

use crate::registry::ChainRegistry;

pub struct TransportResolver {
    registry: Arc<ChainRegistry>,
    cooldown: Duration,
    /// When each URL last failed.  Absent means healthy.
    failed_at: Mutex<HashMap<Url, Instant>>,
}

impl TransportResolver {
    pub fn new(registry: Arc<ChainRegistry>, cooldown: Duration) -> Self {
        Self {
            registry,
            cooldown,
            failed_at: Mutex::new(HashMap::new()),
        }
    }

    /// The endpoint to use for `chain_id` right now.
    pub fn endpoint_for(&self, chain_id: ChainId) -> Result<Url> {
        let transports = &self.registry.resolve(chain_id)?.transports;
        let idx = self.select(chain_id, transports)?;
        Ok(transports[idx].clone())
    }

    /// Every transport for `chain_id`, rotated so the currently selected one
    /// comes first.  Used to fall through the whole list in one pass.
    pub fn candidates(&self, chain_id: ChainId) -> Result<Vec<Url>> {
        let transports = &self.registry.resolve(chain_id)?.transports;
        let idx = self.select(chain_id, transports)?;
        let mut rotated = transports.clone();
        rotated.rotate_left(idx);
        Ok(rotated)
    }

    /// Clear the failure mark for `url`.
    pub fn record_success(&self, url: &Url) {
        if self.failed_at.lock().remove(url).is_some() {
            tracing::debug!(url = %url, "transport recovered");
        }
    }

    /// Stamp `url` as failed now, starting its cooldown.
    pub fn record_failure(&self, url: &Url) {
        self.failed_at.lock().insert(url.clone(), Instant::now());
        tracing::warn!(
            url = %url,
            cooldown_ms = self.cooldown.as_millis() as u64,
            "transport marked as failed, entering cooldown"
        );
    }

    /// Whether `url` failed within the cooldown window.
    pub fn is_cooling_down(&self, url: &Url) -> bool {
        let now = Instant::now();
        self.failed_at
            .lock()
            .get(url)
            .is_some_and(|&at| now.duration_since(at) < self.cooldown)
    }

    pub fn registry(&self) -> &Arc<ChainRegistry> {
        &self.registry
    }

    fn select(&self, chain_id: ChainId, transports: &[Url]) -> Result<usize> {
        if transports.is_empty() {
            return Err(Error::NoTransportAvailable(chain_id));
        }

        let idx = transports
            .iter()
            .position(|url| !self.is_cooling_down(url))
            .unwrap_or(0);

        if idx > 0 {
            TraceEvent::TransportFallback {
                chain_id,
                skipped: transports[0].to_string(),
                selected: transports[idx].to_string(),
            }
            .emit();
        }
        Ok(idx)
    }
}

impl std::fmt::Debug for TransportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResolver")
            .field("chains", &self.registry.len())
            .field("cooldown", &self.cooldown)
            .field("failed", &self.failed_at.lock().len())
            .finish()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use wl_domain::ChainDescriptor;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn resolver(cooldown: Duration) -> TransportResolver {
        let mut reg = ChainRegistry::new();
        reg.register(ChainDescriptor::new(
            1,
            "Ethereum",
            "ETH",
            vec![
                url("https://a.example/"),
                url("https://b.example/"),
                url("https://c.example/"),
            ],
        ))
        .unwrap();
        reg.register(ChainDescriptor::new(137, "Polygon", "POL", vec![]))
            .unwrap();
        TransportResolver::new(Arc::new(reg), cooldown)
    }

    #[test]
    fn prefers_first_transport() {
        let r = resolver(Duration::from_secs(30));
        assert_eq!(r.endpoint_for(ChainId(1)).unwrap(), url("https://a.example/"));
    }

    #[test]
    fn skips_failed_transport() {
        let r = resolver(Duration::from_secs(30));
        r.record_failure(&url("https://a.example/"));
        assert_eq!(r.endpoint_for(ChainId(1)).unwrap(), url("https://b.example/"));

        r.record_failure(&url("https://b.example/"));
        assert_eq!(r.endpoint_for(ChainId(1)).unwrap(), url("https://c.example/"));
    }

    #[test]
    fn wraps_to_first_when_all_failed() {
        let r = resolver(Duration::from_secs(30));
        for u in ["https://a.example/", "https://b.example/", "https://c.example/"] {
            r.record_failure(&url(u));
        }
        assert_eq!(r.endpoint_for(ChainId(1)).unwrap(), url("https://a.example/"));
    }

    #[test]
    fn success_clears_failure() {
        let r = resolver(Duration::from_secs(30));
        r.record_failure(&url("https://a.example/"));
        r.record_success(&url("https://a.example/"));
        assert!(!r.is_cooling_down(&url("https://a.example/")));
        assert_eq!(r.endpoint_for(ChainId(1)).unwrap(), url("https://a.example/"));
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_expires() {
        let r = resolver(Duration::from_secs(30));
        r.record_failure(&url("https://a.example/"));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(r.endpoint_for(ChainId(1)).unwrap(), url("https://b.example/"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(r.endpoint_for(ChainId(1)).unwrap(), url("https://a.example/"));
    }

    #[test]
    fn candidates_rotate_selected_first() {
        let r = resolver(Duration::from_secs(30));
        r.record_failure(&url("https://a.example/"));
        let c = r.candidates(ChainId(1)).unwrap();
        assert_eq!(
            c,
            vec![
                url("https://b.example/"),
                url("https://c.example/"),
                url("https://a.example/"),
            ]
        );
    }

    #[test]
    fn empty_transport_list() {
        let r = resolver(Duration::from_secs(30));
        assert!(matches!(
            r.endpoint_for(ChainId(137)),
            Err(Error::NoTransportAvailable(ChainId(137)))
        ));
    }

    #[test]
    fn unknown_chain_propagates() {
        let r = resolver(Duration::from_secs(30));
        assert!(matches!(
            r.endpoint_for(ChainId(10)),
            Err(Error::UnknownChain(ChainId(10)))
        ));
    }

    #[test]
    fn zero_cooldown_never_skips() {
        let r = resolver(Duration::ZERO);
        r.record_failure(&url("https://a.example/"));
        assert_eq!(r.endpoint_for(ChainId(1)).unwrap(), url("https://a.example/"));
    }
}
