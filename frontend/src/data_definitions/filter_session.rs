//! Per-tab filter state that outlives the filter page itself.

use std::{cell::Cell, collections::BTreeMap, rc::Rc};

use common::{data_source_cache::DataSourceCache, form_schema::SearchDomain, search_state::SearchStateStore};

use crate::api::collaborators::ServerOptionLoader;

/// Provided by the layout, so leaving for the results page and coming back
/// finds the form as it was.
#[derive(Clone)]
pub struct FilterSession {
    pub cache: DataSourceCache,
    stores: Rc<BTreeMap<SearchDomain, SearchStateStore>>,
    current_domain: Rc<Cell<Option<SearchDomain>>>,
}

impl Default for FilterSession {
    fn default() -> Self {
        let stores = SearchDomain::ALL.iter().map(|d| (*d, SearchStateStore::default())).collect();
        Self {
            cache: DataSourceCache::new(Rc::new(ServerOptionLoader)),
            stores: Rc::new(stores),
            current_domain: Rc::new(Cell::new(None)),
        }
    }
}

impl FilterSession {
    /// Called when a filter form mounts. Switching domain empties the filters
    /// of the domain being left and drops every cached option list.
    pub fn enter_domain(&self, domain: SearchDomain) {
        let previous = self.current_domain.replace(Some(domain));
        if let Some(previous) = previous.filter(|p| *p != domain) {
            dioxus::logger::tracing::debug!("Domain switch {previous} -> {domain}, resetting filters and option cache");
            self.store(previous).clear();
            self.cache.reset();
        }
    }

    pub fn store(&self, domain: SearchDomain) -> SearchStateStore {
        self.stores.get(&domain).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use common::filter_codec::FilterValue;

    use super::*;

    #[test]
    fn leaving_a_domain_empties_its_filters() {
        let session = FilterSession::default();
        session.enter_domain(SearchDomain::Opportunity);
        session.store(SearchDomain::Opportunity).set_field("stage", FilterValue::Single("170".into()));

        session.enter_domain(SearchDomain::Opportunity);
        assert!(!session.store(SearchDomain::Opportunity).is_empty());

        session.enter_domain(SearchDomain::Proposal);
        session.store(SearchDomain::Proposal).set_field("proposalTitle", FilterValue::Single("Q3".into()));
        session.enter_domain(SearchDomain::Opportunity);
        assert!(session.store(SearchDomain::Opportunity).is_empty());
        assert!(session.store(SearchDomain::Proposal).is_empty());
    }
}
