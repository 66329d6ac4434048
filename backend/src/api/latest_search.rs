//! Storage of the latest submitted search, one row per submission.

use common::{contracts::RecentSearch, form_schema::SearchDomain, search_payload::SearchPayload};

use crate::db_utils::clickhouse_utils::get_clickhouse_client;

pub async fn save_latest_search(payload: SearchPayload) -> anyhow::Result<()> {
    let client = get_clickhouse_client();
    let sql = "
    INSERT INTO latest_searches (domain, payload_json)
    VALUES (?, ?)
    ";
    let payload_json = serde_json::to_string(&payload.to_wire())?;
    client
        .query(sql)
        .bind(payload.domain.as_str())
        .bind(payload_json)
        .execute()
        .await?;
    tracing::debug!(domain = payload.domain.as_str(), fields = payload.fields.len(), "saved latest search");
    Ok(())
}

pub async fn load_latest_search(domain: SearchDomain) -> anyhow::Result<RecentSearch> {
    let client = get_clickhouse_client();
    let sql = "
    SELECT payload_json
    FROM latest_searches
    WHERE domain = ?
    ORDER BY date_created DESC
    LIMIT 1
    ";
    let rows = client
        .query(sql)
        .bind(domain.as_str())
        .fetch_all::<String>()
        .await?;
    Ok(recent_search_from_rows(domain, rows))
}

/// An unreadable stored payload is reported as an unsuccessful lookup.
pub fn recent_search_from_rows(domain: SearchDomain, rows: Vec<String>) -> RecentSearch {
    let Some(payload_json) = rows.into_iter().next() else {
        return RecentSearch::nothing_saved();
    };
    let parsed = serde_json::from_str::<serde_json::Value>(&payload_json)
        .map_err(anyhow::Error::from)
        .and_then(|value| SearchPayload::from_wire(&value));
    match parsed {
        Ok(payload) if payload.domain == domain => RecentSearch { success: true, search_params: Some(payload) },
        Ok(payload) => {
            tracing::warn!(domain = domain.as_str(), stored = payload.domain.as_str(), "stored search has the wrong domain");
            RecentSearch { success: false, search_params: None }
        }
        Err(e) => {
            tracing::warn!(domain = domain.as_str(), error = %e, "stored search is unreadable");
            RecentSearch { success: false, search_params: None }
        }
    }
}
