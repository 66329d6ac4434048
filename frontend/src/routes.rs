use common::contracts::ResultsHandoff;
use common::form_schema::SearchDomain;
use dioxus::prelude::*;

use crate::components::navbar::Navbar;
use crate::data_definitions::url_param::UrlParam;
use crate::pages::home_page::HomePage;
use crate::pages::filter_search_page::FilterSearchPage;
use crate::pages::results_page::ResultsPage;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Navbar)]


    #[route("/")]
    HomePage {},


    #[route("/filters/:domain")]
    FilterSearchPage { domain: SearchDomain },


    #[route("/results/:handoff")]
    ResultsPage { handoff: UrlParam<ResultsHandoff> },

}

impl Route {
    pub fn results_page_from_handoff(handoff: ResultsHandoff) -> Self {
        Self::ResultsPage { handoff: UrlParam::from(handoff) }
    }
}
