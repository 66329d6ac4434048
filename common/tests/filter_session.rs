use std::{cell::RefCell, rc::Rc};

use common::{
    contracts::{OptionLoader, RecentSearch, ResultsHandoff, ResultsNavigator, SearchPersistence},
    data_source_cache::DataSourceCache,
    filter_codec::{FilterEncoding, decode, encode},
    form_schema::{DataSourceOption, FormConfig, SearchDomain},
    row_layout::pack_rows,
    search_payload::SearchPayload,
    search_state::SearchStateStore,
    search_state_controller::{HydrationOutcome, SearchServices, SearchStateController, SubmitOutcome},
    section_expansion::SectionExpansion,
};
use futures_util::future::LocalBoxFuture;

/// Persistence that remembers the last saved payload, like the real table does.
#[derive(Default)]
struct MemoryPersistence {
    latest: RefCell<Option<SearchPayload>>,
}

impl SearchPersistence for MemoryPersistence {
    fn save<'a>(&'a self, payload: &'a SearchPayload) -> LocalBoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            *self.latest.borrow_mut() = Some(payload.clone());
            Ok(())
        })
    }

    fn load_recent(&self, domain: SearchDomain) -> LocalBoxFuture<'_, anyhow::Result<RecentSearch>> {
        Box::pin(async move {
            let search_params = self.latest.borrow().clone().filter(|p| p.domain == domain);
            Ok(RecentSearch { success: true, search_params })
        })
    }
}

#[derive(Default)]
struct Navigator {
    handoffs: RefCell<Vec<ResultsHandoff>>,
}

impl ResultsNavigator for Navigator {
    fn navigate(&self, handoff: ResultsHandoff) {
        self.handoffs.borrow_mut().push(handoff);
    }
}

#[derive(Default)]
struct StaticLoader {
    calls: RefCell<Vec<String>>,
}

impl OptionLoader for StaticLoader {
    fn fetch<'a>(&'a self, source_name: &'a str) -> LocalBoxFuture<'a, anyhow::Result<Vec<DataSourceOption>>> {
        self.calls.borrow_mut().push(source_name.to_string());
        Box::pin(async move {
            match source_name {
                "salesReps" => Ok(vec![DataSourceOption::new("170", "Ada"), DataSourceOption::new("178", "Grace")]),
                other => anyhow::bail!("no such source {other}"),
            }
        })
    }
}

#[test]
fn wire_format_scenarios() {
    assert_eq!(encode(&["170", "178"], FilterEncoding::Identifier), "IE=170~IE=178~");
    assert_eq!(decode("IE=170~IE=178~"), vec!["170", "178"]);
    assert_eq!(encode(&["Acme"], FilterEncoding::StartsWith), "SW=Acme~");
    assert_eq!(encode(&["IN=Is Empty~"], FilterEncoding::StartsWith), "IN=Is Empty~");
}

#[test]
fn layout_and_expansion_scenarios() {
    let spans = [6u16, 4, 3, 5, 4];
    let rows: Vec<Vec<u16>> = pack_rows(&spans, 12, |s| *s)
        .into_iter()
        .map(|row| row.into_iter().copied().collect())
        .collect();
    assert_eq!(rows, vec![vec![6, 4], vec![3, 5, 4]]);

    for (domain, expected) in [(SearchDomain::Opportunity, 8), (SearchDomain::Proposal, 4)] {
        let form = FormConfig::for_domain(domain);
        let mut expansion = SectionExpansion::for_form(form);
        expansion.expand_all();
        assert!(expansion.is_expanded());
        assert_eq!(expansion.open_sections().len(), expected);
        expansion.collapse_all();
        assert!(!expansion.is_expanded());
    }
}

#[tokio::test]
async fn rep_field_session_from_options_to_results_and_back() {
    let loader = Rc::new(StaticLoader::default());
    let cache = DataSourceCache::new(loader.clone());
    let persistence = Rc::new(MemoryPersistence::default());
    let navigator = Rc::new(Navigator::default());
    let services = SearchServices::new(persistence.clone(), navigator.clone());

    let controller = SearchStateController::new(SearchDomain::Opportunity, SearchStateStore::default(), services.clone());
    assert_eq!(controller.hydrate_on_mount().await, HydrationOutcome::NothingSaved);

    // first click on the rep dropdown loads its options; the manager field shares the source
    let field = controller.form().field("salesRep").unwrap();
    let source = field.data_source_name.clone().unwrap();
    let options = cache.request(&source).await;
    assert_eq!(options.len(), 2);
    cache.request(&source).await;
    assert!(cache.request("nope").await.is_empty());
    assert_eq!(*loader.calls.borrow(), vec!["salesReps".to_string(), "nope".to_string()]);

    for option in &options {
        controller.select_option("salesRep", &option.value);
    }
    assert_eq!(controller.payload().fields["salesRep"], "IE=170~IE=178~");

    controller.select_option("salesRep", "All Reps");
    assert!(controller.payload().fields.get("salesRep").is_none());

    controller.select_option("salesRep", "178");
    controller.select_option("source", "Web");
    controller.select_option("source", "Partner");
    let SubmitOutcome::Submitted(handoff) = controller.submit().await else {
        panic!("submission should pass validation");
    };
    assert_eq!(handoff.summary, "Sales Rep: 178; Source: Web, Partner");
    assert_eq!(handoff.payload.to_wire()["opportunitySearch"]["source"], "Web,Partner");
    assert_eq!(navigator.handoffs.borrow().len(), 1);

    // a new session restores what was submitted
    drop(controller);
    let next = SearchStateController::new(SearchDomain::Opportunity, SearchStateStore::default(), services.clone());
    assert_eq!(next.hydrate_on_mount().await, HydrationOutcome::Restored);
    assert_eq!(next.selections("source"), vec!["Web", "Partner"]);
    assert_eq!(next.payload().fields, handoff.payload.fields);
    assert!(next.payload().is_recent_search);

    // the proposal domain has its own session and nothing saved
    let proposal = SearchStateController::new(SearchDomain::Proposal, SearchStateStore::default(), services);
    assert_eq!(proposal.hydrate_on_mount().await, HydrationOutcome::NothingSaved);
}
