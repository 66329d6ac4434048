pub mod url_param;
pub mod filter_session;
