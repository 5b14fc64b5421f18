//! Read-only algorithm catalog with a local cache.

use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use crate::{
    Result, ShareLock,
    backend::Collection,
    common::MemCache,
    model::AlgorithmModel,
    utils::name::trim_and_upper,
};

/// Algorithms as published by the backend.
///
/// The full list is fetched once and then served from memory until
/// [`AlgorithmCatalog::invalidate`] is called. Single algorithms are cached
/// by name as they are fetched.
pub struct AlgorithmCatalog {
    algorithms: Arc<dyn Collection<Item = AlgorithmModel>>,
    cache: MemCache<String, AlgorithmModel>,
    all: ShareLock<Option<Arc<Vec<AlgorithmModel>>>>,
}

impl AlgorithmCatalog {
    pub fn new(
        algorithms: Arc<dyn Collection<Item = AlgorithmModel>>,
        capacity: u64,
    ) -> Self {
        Self {
            algorithms,
            cache: MemCache::new(capacity),
            all: Arc::new(RwLock::new(None)),
        }
    }

    fn cached_all(&self) -> Option<Arc<Vec<AlgorithmModel>>> {
        self.all.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// All algorithms sorted by name. Property order within each algorithm is
    /// the declared order.
    pub async fn get_all(&self) -> Result<Vec<AlgorithmModel>> {
        if let Some(all) = self.cached_all() {
            debug!("catalog::get_all served from cache ({} algorithms)", all.len());
            return Ok(all.as_ref().clone());
        }

        trace!("catalog::get_all fetching");
        let mut algorithms = self.algorithms.list().await?;
        algorithms.sort_by(|a, b| a.name.cmp(&b.name));
        for algorithm in &algorithms {
            self.cache.set(trim_and_upper(&algorithm.name), algorithm.clone());
        }

        let all = Arc::new(algorithms);
        *self.all.write().unwrap_or_else(|e| e.into_inner()) = Some(all.clone());
        Ok(all.as_ref().clone())
    }

    /// One algorithm by name. Fails with `NotFound` when the backend does not
    /// know it; callers treat that as a missing algorithm.
    pub async fn get(
        &self,
        name: &str,
    ) -> Result<AlgorithmModel> {
        let key = trim_and_upper(name);
        if let Some(algorithm) = self.cache.get(&key) {
            debug!("catalog::get({}) served from cache", key);
            return Ok(algorithm);
        }

        let algorithm = self.algorithms.find(&key).await?;
        self.cache.set(key, algorithm.clone());
        Ok(algorithm)
    }

    /// Forget everything fetched so far.
    pub fn invalidate(&self) {
        trace!("catalog::invalidate");
        self.cache.clear();
        *self.all.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::{PipeforgeError, backend::MemBackend};

    /// Counts backend calls made through the catalog.
    struct Counting {
        inner: Arc<dyn Collection<Item = AlgorithmModel>>,
        lists: AtomicUsize,
        finds: AtomicUsize,
    }

    #[async_trait]
    impl Collection for Counting {
        type Item = AlgorithmModel;

        async fn list(&self) -> Result<Vec<AlgorithmModel>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            self.inner.list().await
        }

        async fn find(
            &self,
            name: &str,
        ) -> Result<AlgorithmModel> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find(name).await
        }

        async fn create(
            &self,
            item: &AlgorithmModel,
        ) -> Result<()> {
            self.inner.create(item).await
        }

        async fn delete(
            &self,
            name: &str,
        ) -> Result<()> {
            self.inner.delete(name).await
        }
    }

    fn algorithm(name: &str) -> AlgorithmModel {
        AlgorithmModel {
            name: name.into(),
            description: format!("{} algorithm", name),
            ..Default::default()
        }
    }

    fn counting() -> Arc<Counting> {
        let mem = MemBackend::new().with_algorithms(vec![algorithm("OCV"), algorithm("FACE"), algorithm("DLIB")]);
        Arc::new(Counting {
            inner: mem.algorithms(),
            lists: AtomicUsize::new(0),
            finds: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_get_all_is_sorted_and_cached() {
        let backend = counting();
        let catalog = AlgorithmCatalog::new(backend.clone(), 16);

        let names: Vec<String> = catalog.get_all().await.unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["DLIB", "FACE", "OCV"]);

        catalog.get_all().await.unwrap();
        catalog.get("face").await.unwrap();
        assert_eq!(backend.lists.load(Ordering::SeqCst), 1);
        assert_eq!(backend.finds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_fetches_once() {
        let backend = counting();
        let catalog = AlgorithmCatalog::new(backend.clone(), 16);

        assert_eq!(catalog.get("OCV").await.unwrap().name, "OCV");
        assert_eq!(catalog.get("ocv").await.unwrap().name, "OCV");
        assert_eq!(backend.finds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let catalog = AlgorithmCatalog::new(counting(), 16);
        let err = catalog.get("YOLO").await.unwrap_err();
        assert_eq!(err, PipeforgeError::NotFound("Algorithm not found: YOLO.".to_string()));
    }

    #[tokio::test]
    async fn test_invalidate_refetches() {
        let backend = counting();
        let catalog = AlgorithmCatalog::new(backend.clone(), 16);

        catalog.get_all().await.unwrap();
        catalog.invalidate();
        catalog.get_all().await.unwrap();
        assert_eq!(backend.lists.load(Ordering::SeqCst), 2);
    }
}
