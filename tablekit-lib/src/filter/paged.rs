//! Paged-autocomplete filter widget.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;

use super::{FilterBinding, FilterValue, PagedOptions};

/// An item offered by a paged picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteItem {
    pub id: String,
    pub label: String,
}

impl AutocompleteItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Remote source behind a paged-autocomplete filter.
#[async_trait]
pub trait PagedSource: Send + Sync {
    /// Total number of items matching `search`.
    async fn count(&self, search: &str) -> Result<usize, FetchError>;

    /// One page of items matching `search`. Pages are zero-based.
    async fn fetch_page(
        &self,
        search: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<AutocompleteItem>, FetchError>;

    /// Point lookup used to label a selected id outside the loaded window.
    async fn fetch_selected_by_id(&self, id: &str) -> Result<Option<AutocompleteItem>, FetchError>;
}

/// Fetch state of a paged picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutocompletePhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Count and first page in flight.
    Fetching,
    /// Items loaded.
    Ready,
    /// The last search failed.
    Failed,
}

/// One entry of the picker as presented to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteOption {
    /// Item id; `None` for the null sentinel.
    pub id: Option<String>,
    pub label: String,
    pub selected: bool,
}

/// Headless view of a paged picker.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteView {
    pub search: String,
    pub options: Vec<AutocompleteOption>,
    /// Label of the current filter value, even when it is not in `options`.
    pub selected_label: Option<String>,
    pub phase: AutocompletePhase,
    pub loading_more: bool,
    pub has_more: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct PagedInner {
    phase: AutocompletePhase,
    search: String,
    /// Last page merged into `items`.
    page: usize,
    items: Vec<AutocompleteItem>,
    /// Total matches reported for `search`.
    total: usize,
    /// Token of the current search; bumped by every search and cancel.
    token: u64,
    cancel: CancellationToken,
    loading_more: bool,
    /// Selected item found by point lookup.
    selected: Option<AutocompleteItem>,
    error: Option<String>,
}

impl PagedInner {
    fn new() -> Self {
        Self {
            phase: AutocompletePhase::Idle,
            search: String::new(),
            page: 0,
            items: Vec::new(),
            total: 0,
            token: 0,
            cancel: CancellationToken::new(),
            loading_more: false,
            selected: None,
            error: None,
        }
    }

    fn has_more(&self) -> bool {
        self.items.len() < self.total
    }

    fn known_item(&self, id: &str) -> Option<&AutocompleteItem> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .or_else(|| self.selected.as_ref().filter(|item| item.id == id))
    }

    /// Abort in-flight requests and invalidate their responses.
    fn supersede(&mut self) -> (u64, CancellationToken) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.token += 1;
        self.loading_more = false;
        (self.token, self.cancel.clone())
    }
}

/// A searchable, incrementally loaded picker bound to one column.
///
/// Searching always restarts at page 0 and replaces the item list; loading
/// more appends the next page, skipping ids already loaded. Every search
/// supersedes the previous one: its requests are cancelled and any response
/// that still arrives is discarded as stale.
///
/// Clones share state.
///
/// # Example
///
/// ```ignore
/// let picker = widget.as_autocomplete().unwrap();
/// picker.search("lamp").await?;
/// if picker.has_more() {
///     picker.load_more().await?;
/// }
/// picker.select(&table.filter_binding("seller"), "s-42");
/// ```
#[derive(Debug, Clone)]
pub struct PagedAutocomplete {
    options: PagedOptions,
    page_size: usize,
    inner: Arc<RwLock<PagedInner>>,
    dirty: Arc<AtomicBool>,
}

impl PagedAutocomplete {
    /// Create an idle picker. `default_page_size` applies when the options
    /// carry no page size.
    pub fn new(options: PagedOptions, default_page_size: usize) -> Self {
        let page_size = options.page_size.unwrap_or(default_page_size).max(1);
        Self {
            options,
            page_size,
            inner: Arc::new(RwLock::new(PagedInner::new())),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, PagedInner>, FetchError> {
        self.inner
            .write()
            .map_err(|_| FetchError::source("autocomplete state poisoned"))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> AutocompletePhase {
        self.inner.read().map(|g| g.phase).unwrap_or_default()
    }

    pub fn search_text(&self) -> String {
        self.inner
            .read()
            .map(|g| g.search.clone())
            .unwrap_or_default()
    }

    /// Loaded items in display order.
    pub fn items(&self) -> Vec<AutocompleteItem> {
        self.inner
            .read()
            .map(|g| g.items.clone())
            .unwrap_or_default()
    }

    /// Last page merged into the item list.
    pub fn page(&self) -> usize {
        self.inner.read().map(|g| g.page).unwrap_or(0)
    }

    /// Total matches reported by the last count.
    pub fn total(&self) -> usize {
        self.inner.read().map(|g| g.total).unwrap_or(0)
    }

    pub fn has_more(&self) -> bool {
        self.inner.read().map(|g| g.has_more()).unwrap_or(false)
    }

    pub fn error(&self) -> Option<String> {
        self.inner.read().ok().and_then(|g| g.error.clone())
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_nullable(&self) -> bool {
        self.options.nullable
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Search for `text`, fetching the total count and page 0.
    ///
    /// Returns [`FetchError::Stale`] or [`FetchError::Cancelled`] when a newer
    /// search or a cancel superseded this one; its results are not applied.
    pub async fn search(&self, text: impl Into<String>) -> Result<(), FetchError> {
        let search = text.into();
        let (token, cancel) = {
            let mut guard = self.write()?;
            guard.search = search.clone();
            guard.phase = AutocompletePhase::Fetching;
            guard.error = None;
            guard.supersede()
        };
        self.dirty.store(true, Ordering::SeqCst);

        let source = Arc::clone(&self.options.source);
        let page_size = self.page_size;
        let fetched = tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = async {
                futures::try_join!(
                    source.count(&search),
                    source.fetch_page(&search, 0, page_size),
                )
            } => result,
        };

        let mut guard = self.write()?;
        if guard.token != token {
            log::debug!(
                "[autocomplete] discarding search {:?} (token {}, current {})",
                search,
                token,
                guard.token
            );
            return Err(FetchError::Stale {
                token,
                current: guard.token,
            });
        }
        self.dirty.store(true, Ordering::SeqCst);

        match fetched {
            Ok((total, items)) => {
                let mut seen = HashSet::new();
                guard.items = items
                    .into_iter()
                    .filter(|item| seen.insert(item.id.clone()))
                    .collect();
                guard.total = total;
                guard.page = 0;
                guard.phase = AutocompletePhase::Ready;
                Ok(())
            }
            Err(e) => {
                guard.phase = AutocompletePhase::Failed;
                guard.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch the next page and append unseen items.
    ///
    /// Returns `Ok(false)` when there is nothing more to load, no search has
    /// completed yet, or a load is already in flight.
    pub async fn load_more(&self) -> Result<bool, FetchError> {
        let (token, page, search, cancel) = {
            let mut guard = self.write()?;
            if guard.phase != AutocompletePhase::Ready || guard.loading_more || !guard.has_more() {
                return Ok(false);
            }
            guard.loading_more = true;
            (
                guard.token,
                guard.page + 1,
                guard.search.clone(),
                guard.cancel.clone(),
            )
        };
        self.dirty.store(true, Ordering::SeqCst);

        let source = Arc::clone(&self.options.source);
        let fetched = tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = source.fetch_page(&search, page, self.page_size) => result,
        };

        let mut guard = self.write()?;
        if guard.token != token {
            log::debug!(
                "[autocomplete] discarding page {} of {:?} (token {}, current {})",
                page,
                search,
                token,
                guard.token
            );
            return Err(FetchError::Stale {
                token,
                current: guard.token,
            });
        }
        guard.loading_more = false;
        self.dirty.store(true, Ordering::SeqCst);

        match fetched {
            Ok(items) => {
                let mut known: HashSet<String> =
                    guard.items.iter().map(|item| item.id.clone()).collect();
                for item in items {
                    if known.insert(item.id.clone()) {
                        guard.items.push(item);
                    }
                }
                guard.page = page;
                Ok(true)
            }
            Err(e) => {
                guard.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Cancel in-flight requests. Their responses will be discarded.
    pub fn cancel(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.supersede();
            if guard.phase == AutocompletePhase::Fetching {
                guard.phase = if guard.items.is_empty() {
                    AutocompletePhase::Idle
                } else {
                    AutocompletePhase::Ready
                };
            }
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Select an item: re-selecting the current item clears the filter,
    /// selecting another item filters by its id.
    pub fn select(&self, binding: &FilterBinding<'_>, item_id: &str) {
        let next = match binding.current() {
            Some(FilterValue::Value(current)) if current == item_id => None,
            _ => Some(FilterValue::value(item_id)),
        };
        if next.is_some()
            && let Ok(mut guard) = self.inner.write()
            && let Some(item) = guard.items.iter().find(|i| i.id == item_id).cloned()
        {
            guard.selected = Some(item);
        }
        binding.set(next);
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Toggle the explicit-null filter. Returns `false` if the picker is not nullable.
    pub fn select_null(&self, binding: &FilterBinding<'_>) -> bool {
        if !self.options.nullable {
            return false;
        }
        let next = match binding.current() {
            Some(FilterValue::Null) => None,
            _ => Some(FilterValue::Null),
        };
        binding.set(next);
        self.dirty.store(true, Ordering::SeqCst);
        true
    }

    /// Make sure the item behind the current filter id is known, looking it
    /// up by id when it is not in the loaded window.
    pub async fn ensure_selected(
        &self,
        binding: &FilterBinding<'_>,
    ) -> Result<Option<AutocompleteItem>, FetchError> {
        let Some(FilterValue::Value(id)) = binding.current() else {
            return Ok(None);
        };
        let known = self
            .inner
            .read()
            .ok()
            .and_then(|g| g.known_item(&id).cloned());
        if known.is_some() {
            return Ok(known);
        }

        log::debug!("[autocomplete] looking up selected id {}", id);
        let item = self.options.source.fetch_selected_by_id(&id).await?;
        if let Some(item) = &item {
            let mut guard = self.write()?;
            guard.selected = Some(item.clone());
            self.dirty.store(true, Ordering::SeqCst);
        }
        Ok(item)
    }

    /// Label of the current filter value.
    pub fn selected_label(&self, binding: &FilterBinding<'_>) -> Option<String> {
        let current = binding.current();
        self.inner
            .read()
            .ok()
            .and_then(|g| self.label_in(&g, current.as_ref()))
    }

    fn label_in(&self, inner: &PagedInner, current: Option<&FilterValue>) -> Option<String> {
        match current? {
            FilterValue::Null => Some(self.options.null_value_label.clone()),
            FilterValue::Value(id) => inner.known_item(id).map(|item| item.label.clone()),
        }
    }

    /// Describe the picker for the column bound by `binding`.
    pub fn view(&self, binding: &FilterBinding<'_>) -> AutocompleteView {
        let current = binding.current();
        let Ok(guard) = self.inner.read() else {
            return AutocompleteView {
                search: String::new(),
                options: Vec::new(),
                selected_label: None,
                phase: AutocompletePhase::Failed,
                loading_more: false,
                has_more: false,
                error: Some("autocomplete state poisoned".to_string()),
            };
        };

        let selected_id = current.as_ref().and_then(FilterValue::as_value);
        let mut options = Vec::with_capacity(guard.items.len() + 1);
        if self.options.nullable {
            options.push(AutocompleteOption {
                id: None,
                label: self.options.null_value_label.clone(),
                selected: matches!(current, Some(FilterValue::Null)),
            });
        }
        options.extend(guard.items.iter().map(|item| AutocompleteOption {
            id: Some(item.id.clone()),
            label: item.label.clone(),
            selected: selected_id == Some(item.id.as_str()),
        }));

        AutocompleteView {
            search: guard.search.clone(),
            options,
            selected_label: self.label_in(&guard, current.as_ref()),
            phase: guard.phase,
            loading_more: guard.loading_more,
            has_more: guard.has_more(),
            error: guard.error.clone(),
        }
    }
}
