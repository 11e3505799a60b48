//! Resolution of declared filter kinds into bound widgets.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::config::AutocompleteConfig;
use crate::error::FetchError;

use super::{DistinctSource, FilterKind, FilterWidget, PagedAutocomplete, SelectFilter};

type OptionsCell = Arc<OnceCell<Arc<Vec<String>>>>;

/// Memo of source fetches shared by every column of one rebuild.
///
/// Columns that share a distinct source (the same `Arc`) fetch its options
/// once, even when resolved concurrently. Drop the cache with the rebuild.
#[derive(Debug, Default)]
pub struct ResolveCache {
    distinct: DashMap<usize, OptionsCell>,
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct sources fetched (or being fetched).
    pub fn len(&self) -> usize {
        self.distinct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct.is_empty()
    }

    async fn distinct_options(
        &self,
        source: &Arc<dyn DistinctSource>,
    ) -> Result<Arc<Vec<String>>, FetchError> {
        let key = Arc::as_ptr(source) as *const () as usize;
        // Clone the cell out so the map shard is unlocked before awaiting.
        let cell = self.distinct.entry(key).or_default().clone();
        cell.get_or_try_init(|| async { source.options().await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }
}

/// Resolve a column's declared filter kind.
///
/// Returns `Ok(None)` for [`FilterKind::None`]. A paged picker is resolved by
/// running its initial (empty) search; a failure there fails the resolution.
pub async fn resolve_filter(
    column_id: &str,
    kind: &FilterKind,
    cache: &ResolveCache,
    config: &AutocompleteConfig,
) -> Result<Option<FilterWidget>, FetchError> {
    match kind {
        FilterKind::None => Ok(None),
        FilterKind::Custom(custom) => Ok(Some(FilterWidget::Custom(custom.clone()))),
        FilterKind::Distinct(options) => {
            let values = cache.distinct_options(&options.source).await?;
            log::debug!(
                "[filter] resolved {} distinct values for column {}",
                values.len(),
                column_id
            );
            Ok(Some(FilterWidget::Select(SelectFilter::new(values))))
        }
        FilterKind::PagedAutocomplete(options) => {
            let picker = PagedAutocomplete::new(options.clone(), config.page_size);
            picker.search("").await?;
            log::debug!(
                "[filter] resolved paged picker for column {} ({} of {} items)",
                column_id,
                picker.items().len(),
                picker.total()
            );
            Ok(Some(FilterWidget::Autocomplete(picker)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::filter::{CustomFilter, DistinctOptions, FilterView};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DistinctSource for CountingSource {
        async fn options(&self) -> Result<Vec<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(vec!["new".into(), "used".into()])
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DistinctSource for FailingSource {
        async fn options(&self) -> Result<Vec<String>, FetchError> {
            Err(FetchError::source("distinct endpoint down"))
        }
    }

    #[tokio::test]
    async fn test_shared_source_fetched_once_per_rebuild() {
        let source = Arc::new(CountingSource::default());
        let shared: Arc<dyn DistinctSource> = source.clone();
        let kind = FilterKind::Distinct(DistinctOptions {
            source: shared.clone(),
        });
        let other = FilterKind::Distinct(DistinctOptions { source: shared });
        let cache = ResolveCache::new();
        let config = AutocompleteConfig::default();

        let (a, b) = futures::join!(
            resolve_filter("condition", &kind, &cache, &config),
            resolve_filter("condition_copy", &other, &cache, &config),
        );
        assert!(a.unwrap().unwrap().as_select().is_some());
        assert!(b.unwrap().unwrap().as_select().is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        // A fresh rebuild fetches again.
        let cache = ResolveCache::new();
        resolve_filter("condition", &kind, &cache, &config)
            .await
            .unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let kind = FilterKind::Distinct(DistinctOptions::new(FailingSource));
        let result = resolve_filter(
            "status",
            &kind,
            &ResolveCache::new(),
            &AutocompleteConfig::default(),
        )
        .await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::source("distinct endpoint down")
        );
    }

    #[tokio::test]
    async fn test_none_and_custom() {
        let cache = ResolveCache::new();
        let config = AutocompleteConfig::default();
        assert!(
            resolve_filter("title", &FilterKind::None, &cache, &config)
                .await
                .unwrap()
                .is_none()
        );

        let custom = FilterKind::Custom(CustomFilter::new(|_| FilterView::Text {
            value: String::new(),
            placeholder: String::new(),
        }));
        let widget = resolve_filter("title", &custom, &cache, &config)
            .await
            .unwrap();
        assert!(matches!(widget, Some(FilterWidget::Custom(_))));
        assert!(cache.is_empty());
    }
}
