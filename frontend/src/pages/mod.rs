pub mod home_page;
pub mod filter_search_page;
pub mod results_page;
