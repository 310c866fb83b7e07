use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Single-value cache whose entry expires after a fixed TTL.
#[derive(Clone)]
pub struct Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<Option<Entry<V>>>>,
    ttl: Duration,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
            ttl,
        }
    }

    pub async fn get(&self) -> Option<V> {
        let cache = self.inner.lock().await;
        match cache.as_ref() {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!("Cache HIT");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry expired");
                None
            }
            None => {
                debug!("Cache MISS");
                None
            }
        }
    }

    pub async fn put(&self, value: V) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT");
        *cache = Some(Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        });
    }

    pub async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        *cache = None;
    }
}
