use crate::api::DirectoryApi;
use crate::cache::SessionCache;
use crate::error::ApiError;
use crate::types::{ContractorProfile, Job, LabourProfile, ListingKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Live,
    /// Served from the last successful fetch.
    Cached,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub source: ListingSource,
}

/// Browse listings with graceful degradation: live fetch when signed in,
/// then the cached mirror, then an empty list.
pub struct Directory<A: ?Sized> {
    api: Arc<A>,
    cache: SessionCache,
}

impl<A> Directory<A>
where
    A: DirectoryApi + ?Sized,
{
    pub fn new(api: Arc<A>, cache: SessionCache) -> Self {
        Self { api, cache }
    }

    pub async fn labours(&self) -> Fetched<LabourProfile> {
        let live = if self.cache.has_session() {
            Some(self.api.list_labours().await)
        } else {
            None
        };
        self.resolve(ListingKind::Labours, live)
    }

    pub async fn contractors(&self) -> Fetched<ContractorProfile> {
        let live = if self.cache.has_session() {
            Some(self.api.list_contractors().await)
        } else {
            None
        };
        self.resolve(ListingKind::Contractors, live)
    }

    pub async fn jobs(&self) -> Fetched<Job> {
        let live = if self.cache.has_session() {
            Some(self.api.list_jobs().await)
        } else {
            None
        };
        self.resolve(ListingKind::Jobs, live)
    }

    fn resolve<T>(&self, kind: ListingKind, live: Option<Result<Vec<T>, ApiError>>) -> Fetched<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let role = kind.cache_role();
        match live {
            Some(Ok(items)) => {
                if let Err(err) = self.cache.set_cards(role, &items) {
                    warn!(listing = kind.noun(), %err, "failed to mirror listing");
                }
                return Fetched {
                    items,
                    source: ListingSource::Live,
                };
            }
            Some(Err(err)) => {
                warn!(listing = kind.noun(), %err, "live fetch failed, using cached listing");
            }
            None => {}
        }
        match self.cache.cards::<T>(role) {
            Ok(Some(items)) => Fetched {
                items,
                source: ListingSource::Cached,
            },
            Ok(None) => Fetched {
                items: Vec::new(),
                source: ListingSource::Empty,
            },
            Err(err) => {
                warn!(listing = kind.noun(), %err, "cached listing unreadable");
                Fetched {
                    items: Vec::new(),
                    source: ListingSource::Empty,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeApi, labour};

    #[tokio::test]
    async fn live_fetch_is_mirrored_for_later_fallback() {
        let api = Arc::new(FakeApi::new());
        *api.labours.lock().unwrap() = Some(vec![labour("L1", "Ravi", "Pune", "Mason")]);
        let cache = SessionCache::in_memory();
        cache.set_tokens("t", None).unwrap();
        let directory = Directory::new(Arc::clone(&api), cache.clone());

        let live = directory.labours().await;
        assert_eq!(live.source, ListingSource::Live);

        *api.labours.lock().unwrap() = None;
        let fallback = directory.labours().await;
        assert_eq!(fallback.source, ListingSource::Cached);
        assert_eq!(fallback.items, live.items);
    }

    #[tokio::test]
    async fn without_session_only_the_cache_is_consulted() {
        let api = Arc::new(FakeApi::new());
        *api.labours.lock().unwrap() = Some(vec![labour("L1", "Ravi", "Pune", "Mason")]);
        let directory = Directory::new(Arc::clone(&api), SessionCache::in_memory());

        let fetched = directory.labours().await;

        assert_eq!(fetched.source, ListingSource::Empty);
        assert!(fetched.items.is_empty());
        assert!(api.calls().is_empty());
    }
}
