//! Lazy, per-session cache of remote option lists.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use crate::{contracts::OptionLoader, form_schema::DataSourceOption};

#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceEntry {
    pub source_name: String,
    pub options: Option<Vec<DataSourceOption>>,
    pub is_loading: bool,
    pub has_errored: bool,
}

impl DataSourceEntry {
    fn new(source_name: &str) -> Self {
        Self { source_name: source_name.to_string(), options: None, is_loading: false, has_errored: false }
    }
}

/// Shared handle; clones see the same entries.
///
/// A source is fetched once and then served from memory until [`reset`].
/// A request made while the source is loading does not start a second fetch.
/// A failed fetch leaves an empty, errored entry that the next request retries.
///
/// [`reset`]: DataSourceCache::reset
#[derive(Clone)]
pub struct DataSourceCache {
    entries: Rc<RefCell<BTreeMap<String, DataSourceEntry>>>,
    generation: Rc<Cell<u64>>,
    loader: Rc<dyn OptionLoader>,
}

impl DataSourceCache {
    pub fn new(loader: Rc<dyn OptionLoader>) -> Self {
        Self { entries: Rc::default(), generation: Rc::default(), loader }
    }

    pub async fn request(&self, source_name: &str) -> Vec<DataSourceOption> {
        {
            let mut entries = self.entries.borrow_mut();
            let entry = entries
                .entry(source_name.to_string())
                .or_insert_with(|| DataSourceEntry::new(source_name));
            if entry.is_loading {
                tracing::debug!(source = source_name, "data source already loading");
                return entry.options.clone().unwrap_or_default();
            }
            if let Some(options) = entry.options.as_ref().filter(|_| !entry.has_errored) {
                tracing::debug!(source = source_name, "data source cache hit");
                return options.clone();
            }
            entry.is_loading = true;
        }

        let generation = self.generation.get();
        tracing::debug!(source = source_name, "data source cache miss, fetching");
        let result = self.loader.fetch(source_name).await;

        if self.generation.get() != generation {
            tracing::debug!(source = source_name, "cache was reset during fetch, dropping response");
            return result.unwrap_or_default();
        }

        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .entry(source_name.to_string())
            .or_insert_with(|| DataSourceEntry::new(source_name));
        entry.is_loading = false;
        match result {
            Ok(options) => {
                entry.has_errored = false;
                entry.options = Some(options.clone());
                options
            }
            Err(e) => {
                tracing::warn!(source = source_name, error = %e, "failed to load data source options");
                entry.has_errored = true;
                entry.options = Some(Vec::new());
                Vec::new()
            }
        }
    }

    pub fn entry(&self, source_name: &str) -> Option<DataSourceEntry> {
        self.entries.borrow().get(source_name).cloned()
    }

    /// Cached options without triggering a fetch.
    pub fn options(&self, source_name: &str) -> Vec<DataSourceOption> {
        self.entries
            .borrow()
            .get(source_name)
            .and_then(|e| e.options.clone())
            .unwrap_or_default()
    }

    pub fn is_loading(&self, source_name: &str) -> bool {
        self.entries.borrow().get(source_name).is_some_and(|e| e.is_loading)
    }

    /// Forgets every entry, e.g. on a domain switch.
    pub fn reset(&self) {
        self.generation.set(self.generation.get() + 1);
        self.entries.borrow_mut().clear();
    }
}
