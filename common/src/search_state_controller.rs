//! Orchestrates one search session: state changes, the derived payload,
//! hydration from the latest saved search, and submission.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{
    contracts::{ResultsHandoff, ResultsNavigator, SearchPersistence},
    filter_codec::{FilterValue, is_all_sentinel, is_emptiness_sentinel},
    form_schema::{FormConfig, SearchDomain},
    search_const::DEFAULT_PAGE_TYPE,
    search_payload::{
        DomainPayloadBuilder, PayloadBuilder, PayloadValidator, SearchPayload, StructuralValidator, ValidationReport,
        encode_state, summarize,
    },
    search_state::{SearchState, SearchStateStore, SubscriptionId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchPhase {
    Empty,
    Populated,
    Submitting,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HydrationOutcome {
    /// Already attempted, or the session carries filters.
    Skipped,
    Restored,
    NothingSaved,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(ResultsHandoff),
    Rejected(ValidationReport),
}

/// The collaborators a controller calls out to.
#[derive(Clone)]
pub struct SearchServices {
    pub persistence: Rc<dyn SearchPersistence>,
    pub navigator: Rc<dyn ResultsNavigator>,
    pub validator: Rc<dyn PayloadValidator>,
    pub builder: Rc<dyn PayloadBuilder>,
}

impl SearchServices {
    /// Uses the structural validator and the domain payload builder.
    pub fn new(persistence: Rc<dyn SearchPersistence>, navigator: Rc<dyn ResultsNavigator>) -> Self {
        Self {
            persistence,
            navigator,
            validator: Rc::new(StructuralValidator),
            builder: Rc::new(DomainPayloadBuilder),
        }
    }
}

/// State shared with the store subscription that keeps the payload in sync.
struct Derived {
    form: &'static FormConfig,
    builder: Rc<dyn PayloadBuilder>,
    page_type: String,
    payload: RefCell<Option<SearchPayload>>,
    restored: Cell<bool>,
    phase: Cell<SearchPhase>,
}

impl Derived {
    fn project(&self, state: &SearchState) -> SearchPayload {
        let encoded = encode_state(state, self.form);
        let fields = self.builder.build(&encoded, self.form.domain);
        SearchPayload::new(self.form.domain, fields, self.page_type.clone(), self.restored.get())
    }

    /// Rebuilt from scratch on every change.
    fn refresh(&self, state: &SearchState) {
        if state.is_empty() {
            *self.payload.borrow_mut() = None;
            self.phase.set(SearchPhase::Empty);
            return;
        }
        *self.payload.borrow_mut() = Some(self.project(state));
        if self.phase.get() != SearchPhase::Submitting {
            self.phase.set(SearchPhase::Populated);
        }
    }
}

/// One instance per search domain and session.
pub struct SearchStateController {
    store: SearchStateStore,
    services: SearchServices,
    derived: Rc<Derived>,
    subscription: SubscriptionId,
    // Bumped by every user mutation so a slow hydration can tell it lost the race.
    edits: Cell<u64>,
}

impl SearchStateController {
    pub fn new(domain: SearchDomain, store: SearchStateStore, services: SearchServices) -> Self {
        Self::with_page_type(domain, store, services, DEFAULT_PAGE_TYPE)
    }

    pub fn with_page_type(domain: SearchDomain, store: SearchStateStore, services: SearchServices, page_type: impl Into<String>) -> Self {
        let derived = Rc::new(Derived {
            form: FormConfig::for_domain(domain),
            builder: services.builder.clone(),
            page_type: page_type.into(),
            payload: RefCell::new(None),
            restored: Cell::new(false),
            phase: Cell::new(SearchPhase::Empty),
        });
        derived.refresh(&store.get());

        let listener = derived.clone();
        let subscription = store.subscribe(move |state| listener.refresh(state));
        Self { store, services, derived, subscription, edits: Cell::new(0) }
    }

    pub fn domain(&self) -> SearchDomain {
        self.derived.form.domain
    }

    pub fn form(&self) -> &'static FormConfig {
        self.derived.form
    }

    pub fn store(&self) -> &SearchStateStore {
        &self.store
    }

    pub fn phase(&self) -> SearchPhase {
        self.derived.phase.get()
    }

    /// True while the state is exactly what hydration restored.
    pub fn is_recent_search(&self) -> bool {
        self.derived.restored.get()
    }

    /// The payload derived from the latest state change, if any.
    pub fn cached_payload(&self) -> Option<SearchPayload> {
        self.derived.payload.borrow().clone()
    }

    pub fn payload(&self) -> SearchPayload {
        self.cached_payload().unwrap_or_else(|| self.derived.project(&self.store.get()))
    }

    pub fn selections(&self, field_name: &str) -> Vec<String> {
        let Some(field) = self.form().field(field_name) else {
            return Vec::new();
        };
        self.store
            .get_field(field_name)
            .map(|v| v.selections(field.encoding()))
            .unwrap_or_default()
    }

    /// Restores the latest saved search, once per session and only into an empty form.
    /// The session is the store: a controller built later on the same store
    /// does not restore again.
    pub async fn hydrate_on_mount(&self) -> HydrationOutcome {
        if self.store.settle_hydration() {
            return HydrationOutcome::Skipped;
        }
        if !self.store.is_empty() {
            tracing::debug!(domain = %self.domain(), "session already has filters, not hydrating");
            return HydrationOutcome::Skipped;
        }

        let edits_before = self.edits.get();
        let recent = match self.services.persistence.load_recent(self.domain()).await {
            Ok(recent) => recent,
            Err(e) => {
                tracing::warn!(domain = %self.domain(), error = %e, "failed to load latest search");
                return HydrationOutcome::Failed;
            }
        };
        if !recent.success {
            tracing::warn!(domain = %self.domain(), "latest search lookup was unsuccessful");
            return HydrationOutcome::Failed;
        }
        let Some(saved) = recent.search_params else {
            return HydrationOutcome::NothingSaved;
        };
        if saved.domain != self.domain() {
            tracing::debug!(domain = %self.domain(), saved = %saved.domain, "latest search belongs to another domain");
            return HydrationOutcome::NothingSaved;
        }
        if self.edits.get() != edits_before || !self.store.is_empty() {
            tracing::info!(domain = %self.domain(), "filters changed while loading latest search, keeping them");
            return HydrationOutcome::Skipped;
        }

        let form = self.form();
        let state: SearchState = saved
            .fields
            .into_iter()
            .filter(|(name, token)| !token.trim().is_empty() && form.field(name).is_some())
            .map(|(name, token)| (name, FilterValue::Encoded(token)))
            .collect();
        if state.is_empty() {
            return HydrationOutcome::NothingSaved;
        }

        tracing::info!(domain = %self.domain(), fields = state.len(), "restored latest search");
        self.derived.restored.set(true);
        self.store.set(state);
        HydrationOutcome::Restored
    }

    fn begin_edit(&self, field_name: &str) -> bool {
        if self.form().field(field_name).is_none() {
            tracing::warn!(field = field_name, domain = %self.domain(), "ignoring change to unknown field");
            return false;
        }
        self.edits.set(self.edits.get() + 1);
        self.derived.restored.set(false);
        true
    }

    /// Replaces a field's value. Blank values remove the field.
    pub fn set_field_value(&self, field_name: &str, value: FilterValue) {
        if self.begin_edit(field_name) {
            self.store.set_field(field_name, value);
        }
    }

    pub fn remove_field(&self, field_name: &str) {
        if self.begin_edit(field_name) {
            self.store.remove_field(field_name);
        }
    }

    /// Applies a click on an option of a select-style field.
    ///
    /// An "All" sentinel clears the field. On multi-value fields a concrete
    /// value toggles in or out of the selection; when nothing is selected
    /// (the implicit all-state) or an emptiness sentinel is active, it starts a
    /// fresh one-element selection. Emptiness sentinels always replace the
    /// whole selection.
    pub fn select_option(&self, field_name: &str, option_value: &str) {
        let Some(field) = self.form().field(field_name) else {
            tracing::warn!(field = field_name, domain = %self.domain(), "ignoring selection on unknown field");
            return;
        };
        let value = option_value.trim();
        if is_all_sentinel(value) {
            self.remove_field(field_name);
            return;
        }

        let next = if !field.component_kind.accumulates_selections() || is_emptiness_sentinel(value) {
            FilterValue::Single(value.to_string())
        } else {
            let mut selections: Vec<String> = self
                .selections(field_name)
                .into_iter()
                .filter(|v| !is_emptiness_sentinel(v) && !is_all_sentinel(v))
                .collect();
            match selections.iter().position(|v| v == value) {
                Some(index) => {
                    selections.remove(index);
                }
                None => selections.push(value.to_string()),
            }
            FilterValue::Multi(selections)
        };
        self.set_field_value(field_name, next);
    }

    /// Empties the form. Never triggers hydration.
    pub fn clear(&self) {
        self.store.settle_hydration();
        self.edits.set(self.edits.get() + 1);
        self.derived.restored.set(false);
        self.store.clear();
        *self.derived.payload.borrow_mut() = None;
        self.derived.phase.set(SearchPhase::Cleared);
    }

    /// Validates, saves (best effort) and hands the payload to the results view.
    pub async fn submit(&self) -> SubmitOutcome {
        let payload = self.payload();
        let previous = self.derived.phase.replace(SearchPhase::Submitting);

        let report = self.services.validator.validate(&payload);
        if !report.is_valid {
            tracing::info!(domain = %self.domain(), errors = report.errors.len(), "search payload rejected");
            self.derived.phase.set(previous);
            return SubmitOutcome::Rejected(report);
        }

        if let Err(e) = self.services.persistence.save(&payload).await {
            tracing::warn!(domain = %self.domain(), error = %e, "failed to save latest search");
        }

        let handoff = ResultsHandoff {
            summary: summarize(&payload, self.form()),
            payload,
            preserve_form_state: true,
        };
        self.services.navigator.navigate(handoff.clone());
        self.derived.phase.set(if self.store.is_empty() { previous } else { SearchPhase::Populated });
        SubmitOutcome::Submitted(handoff)
    }
}

impl Drop for SearchStateController {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use futures_util::future::LocalBoxFuture;

    use super::*;
    use crate::{contracts::RecentSearch, search_payload::EncodedFieldMap};

    #[derive(Default)]
    struct FakePersistence {
        recent: RefCell<Option<anyhow::Result<RecentSearch>>>,
        saved: RefCell<Vec<SearchPayload>>,
        fail_save: bool,
    }

    impl SearchPersistence for FakePersistence {
        fn save<'a>(&'a self, payload: &'a SearchPayload) -> LocalBoxFuture<'a, anyhow::Result<()>> {
            Box::pin(async move {
                if self.fail_save {
                    anyhow::bail!("storage offline");
                }
                self.saved.borrow_mut().push(payload.clone());
                Ok(())
            })
        }

        fn load_recent(&self, _domain: SearchDomain) -> LocalBoxFuture<'_, anyhow::Result<RecentSearch>> {
            Box::pin(async move {
                tokio::task::yield_now().await;
                self.recent.borrow_mut().take().unwrap_or_else(|| Ok(RecentSearch::nothing_saved()))
            })
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        handoffs: RefCell<Vec<ResultsHandoff>>,
    }

    impl ResultsNavigator for RecordingNavigator {
        fn navigate(&self, handoff: ResultsHandoff) {
            self.handoffs.borrow_mut().push(handoff);
        }
    }

    fn saved_search(domain: SearchDomain, fields: &[(&str, &str)]) -> RecentSearch {
        let fields: EncodedFieldMap = fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        RecentSearch { success: true, search_params: Some(SearchPayload::new(domain, fields, DEFAULT_PAGE_TYPE, false)) }
    }

    fn controller(persistence: Rc<FakePersistence>, navigator: Rc<RecordingNavigator>) -> SearchStateController {
        SearchStateController::new(
            SearchDomain::Opportunity,
            SearchStateStore::default(),
            SearchServices::new(persistence, navigator),
        )
    }

    #[test]
    fn every_change_rebuilds_the_payload() {
        let c = controller(Rc::default(), Rc::default());
        assert_eq!(c.phase(), SearchPhase::Empty);
        assert!(c.cached_payload().is_none());

        c.select_option("stage", "170");
        c.select_option("stage", "178");
        assert_eq!(c.phase(), SearchPhase::Populated);
        assert_eq!(c.payload().fields["stage"], "IE=170~IE=178~");

        c.select_option("stage", "170");
        assert_eq!(c.payload().fields["stage"], "IE=178~");
        c.select_option("stage", "178");
        assert_eq!(c.phase(), SearchPhase::Empty);
        assert!(c.cached_payload().is_none());
    }

    #[test]
    fn all_sentinel_clears_and_concrete_value_starts_fresh() {
        let c = controller(Rc::default(), Rc::default());
        c.select_option("salesRep", "170");
        c.select_option("salesRep", "178");
        c.select_option("salesRep", "All Reps");
        assert!(!c.payload().fields.contains_key("salesRep"));
        assert!(c.selections("salesRep").is_empty());

        c.select_option("salesRep", "42");
        assert_eq!(c.selections("salesRep"), vec!["42"]);
        assert_eq!(c.payload().fields["salesRep"], "IE=42~");
    }

    #[test]
    fn emptiness_sentinel_replaces_selection_and_back() {
        let c = controller(Rc::default(), Rc::default());
        c.set_field_value("amount", FilterValue::Single("100".into()));
        c.select_option("amount", "IN=Is Empty~");
        assert_eq!(c.payload().fields["amount"], "IN=Is Empty~");

        c.select_option("region", "EMEA");
        c.select_option("region", "INN=Is Not Empty~");
        assert_eq!(c.payload().fields["region"], "INN=Is Not Empty~");
        c.select_option("region", "APAC");
        assert_eq!(c.payload().fields["region"], "IE=APAC~");
    }

    #[test]
    fn single_select_replaces_value() {
        let c = controller(Rc::default(), Rc::default());
        c.select_option("priority", "High");
        c.select_option("priority", "Low");
        assert_eq!(c.payload().fields["priority"], "IE=Low~");
        c.select_option("priority", "All");
        assert!(c.payload().is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let c = controller(Rc::default(), Rc::default());
        c.select_option("proposalTitle", "x");
        c.set_field_value("nope", FilterValue::Single("x".into()));
        assert!(c.store().is_empty());
    }

    #[tokio::test]
    async fn hydration_restores_saved_search_once() {
        let persistence = Rc::new(FakePersistence::default());
        *persistence.recent.borrow_mut() = Some(Ok(saved_search(SearchDomain::Opportunity, &[("stage", "IE=1~IE=2~"), ("bogus", "IE=3~")])));
        let c = controller(persistence.clone(), Rc::default());

        assert_eq!(c.hydrate_on_mount().await, HydrationOutcome::Restored);
        assert_eq!(c.selections("stage"), vec!["1", "2"]);
        assert!(c.payload().is_recent_search);
        assert!(!c.payload().fields.contains_key("bogus"));
        assert_eq!(c.hydrate_on_mount().await, HydrationOutcome::Skipped);

        c.select_option("stage", "3");
        assert_eq!(c.payload().fields["stage"], "IE=1~IE=2~IE=3~");
        assert!(!c.payload().is_recent_search);
    }

    #[tokio::test]
    async fn hydration_is_skipped_when_filters_exist() {
        let persistence = Rc::new(FakePersistence::default());
        *persistence.recent.borrow_mut() = Some(Ok(saved_search(SearchDomain::Opportunity, &[("stage", "IE=1~")])));
        let store = SearchStateStore::default();
        store.set_field("region", FilterValue::Single("EMEA".into()));
        let c = SearchStateController::new(SearchDomain::Opportunity, store, SearchServices::new(persistence, Rc::new(RecordingNavigator::default())));
        assert_eq!(c.phase(), SearchPhase::Populated);
        assert_eq!(c.hydrate_on_mount().await, HydrationOutcome::Skipped);
        assert_eq!(c.selections("stage"), Vec::<String>::new());
    }

    #[tokio::test]
    async fn hydration_failures_leave_the_session_empty() {
        let persistence = Rc::new(FakePersistence::default());
        *persistence.recent.borrow_mut() = Some(Err(anyhow::anyhow!("timeout")));
        let c = controller(persistence.clone(), Rc::default());
        assert_eq!(c.hydrate_on_mount().await, HydrationOutcome::Failed);
        assert!(c.store().is_empty());

        let c = controller(Rc::default(), Rc::default());
        assert_eq!(c.hydrate_on_mount().await, HydrationOutcome::NothingSaved);

        let persistence = Rc::new(FakePersistence::default());
        *persistence.recent.borrow_mut() = Some(Ok(RecentSearch { success: false, search_params: None }));
        let c = controller(persistence, Rc::default());
        assert_eq!(c.hydrate_on_mount().await, HydrationOutcome::Failed);

        let persistence = Rc::new(FakePersistence::default());
        *persistence.recent.borrow_mut() = Some(Ok(saved_search(SearchDomain::Proposal, &[("proposalTitle", "SW=x~")])));
        let c = controller(persistence, Rc::default());
        assert_eq!(c.hydrate_on_mount().await, HydrationOutcome::NothingSaved);
        assert_eq!(c.phase(), SearchPhase::Empty);
    }

    #[tokio::test]
    async fn edits_during_hydration_win() {
        let persistence = Rc::new(FakePersistence::default());
        *persistence.recent.borrow_mut() = Some(Ok(saved_search(SearchDomain::Opportunity, &[("stage", "IE=1~")])));
        let c = controller(persistence, Rc::default());
        let edit = async {
            c.clear();
        };
        let (outcome, ()) = futures_util::future::join(c.hydrate_on_mount(), edit).await;
        assert_eq!(outcome, HydrationOutcome::Skipped);
        assert!(c.store().is_empty());
        assert_eq!(c.phase(), SearchPhase::Cleared);
    }

    #[tokio::test]
    async fn clear_does_not_rehydrate() {
        let persistence = Rc::new(FakePersistence::default());
        *persistence.recent.borrow_mut() = Some(Ok(saved_search(SearchDomain::Opportunity, &[("stage", "IE=1~")])));
        let c = controller(persistence.clone(), Rc::default());
        c.clear();
        assert_eq!(c.hydrate_on_mount().await, HydrationOutcome::Skipped);
        assert!(persistence.recent.borrow().is_some());
    }

    #[tokio::test]
    async fn remounted_form_does_not_restore_after_clear() {
        let persistence = Rc::new(FakePersistence::default());
        *persistence.recent.borrow_mut() = Some(Ok(saved_search(SearchDomain::Opportunity, &[("stage", "IE=1~")])));
        let store = SearchStateStore::default();
        let services = SearchServices::new(persistence.clone(), Rc::new(RecordingNavigator::default()));

        let first = SearchStateController::new(SearchDomain::Opportunity, store.clone(), services.clone());
        first.clear();
        drop(first);

        let remounted = SearchStateController::new(SearchDomain::Opportunity, store.clone(), services);
        assert_eq!(remounted.hydrate_on_mount().await, HydrationOutcome::Skipped);
        assert!(remounted.store().is_empty());
        assert!(persistence.recent.borrow().is_some());
        assert!(store.is_hydration_settled());
    }

    #[tokio::test]
    async fn submit_saves_and_navigates() {
        let persistence = Rc::new(FakePersistence::default());
        let navigator = Rc::new(RecordingNavigator::default());
        let c = controller(persistence.clone(), navigator.clone());
        c.select_option("stage", "Won");

        let SubmitOutcome::Submitted(handoff) = c.submit().await else {
            panic!("expected submission");
        };
        assert!(handoff.preserve_form_state);
        assert_eq!(handoff.summary, "Stage: Won");
        assert_eq!(persistence.saved.borrow().len(), 1);
        assert_eq!(navigator.handoffs.borrow().as_slice(), &[handoff]);
        assert_eq!(c.phase(), SearchPhase::Populated);
        assert_eq!(c.selections("stage"), vec!["Won"]);
    }

    #[tokio::test]
    async fn save_failure_does_not_block_navigation() {
        let persistence = Rc::new(FakePersistence { fail_save: true, ..Default::default() });
        let navigator = Rc::new(RecordingNavigator::default());
        let c = controller(persistence, navigator.clone());
        c.select_option("region", "EMEA");
        assert!(matches!(c.submit().await, SubmitOutcome::Submitted(_)));
        assert_eq!(navigator.handoffs.borrow().len(), 1);
    }

    #[tokio::test]
    async fn invalid_payload_blocks_everything() {
        let persistence = Rc::new(FakePersistence::default());
        let navigator = Rc::new(RecordingNavigator::default());
        let c = controller(persistence.clone(), navigator.clone());
        c.set_field_value("stage", FilterValue::Encoded("IE=1".into()));

        let SubmitOutcome::Rejected(report) = c.submit().await else {
            panic!("expected rejection");
        };
        assert_eq!(report.errors.len(), 1);
        assert!(persistence.saved.borrow().is_empty());
        assert!(navigator.handoffs.borrow().is_empty());
        assert_eq!(c.phase(), SearchPhase::Populated);
    }
}
