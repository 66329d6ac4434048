//! Forwards a submitted payload to the search service.

use common::{contracts::SearchResults, search_payload::SearchPayload};

pub async fn execute_search(payload: SearchPayload) -> anyhow::Result<SearchResults> {
    let search_url = std::env::var("SEARCH_API_URL").unwrap_or("http://127.0.0.1:9400/search".to_string());
    let body = serde_json::to_string(&payload.to_wire())?;

    let t0 = std::time::Instant::now();
    let client = reqwest::Client::new();
    let response = client
        .post(search_url)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await?;
    let status = response.status();
    let response_txt = response.text().await?;
    if status.is_client_error() || status.is_server_error() {
        anyhow::bail!("Error: {}: {}", status, response_txt);
    }
    let results = parse_search_response(&response_txt)?;
    tracing::info!(
        domain = payload.domain.as_str(),
        total = results.total,
        took_ms = t0.elapsed().as_millis() as u64,
        "search executed"
    );
    Ok(results)
}

pub fn parse_search_response(response_txt: &str) -> anyhow::Result<SearchResults> {
    let results: SearchResults = serde_json::from_str(response_txt)?;
    Ok(results)
}
