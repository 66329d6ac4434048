//! Option lists backing the select-style filter fields.

use std::collections::HashSet;

use common::form_schema::DataSourceOption;

use crate::db_utils::clickhouse_utils::get_clickhouse_client;

/// Upper bound on autocomplete suggestions per keystroke.
pub const MAX_SUGGESTIONS: usize = 20;

pub async fn list_data_source_options(source_name: String) -> anyhow::Result<Vec<DataSourceOption>> {
    let client = get_clickhouse_client();
    let sql = "
    SELECT options_json
    FROM filter_data_sources
    WHERE source_name = ?
    ORDER BY date_created DESC
    LIMIT 1
    ";
    let rows = client
        .query(sql)
        .bind(source_name.clone())
        .fetch_all::<String>()
        .await?;
    let Some(options_json) = rows.into_iter().next() else {
        anyhow::bail!("Unknown data source: {}", source_name);
    };
    let options = parse_options(&options_json)?;
    tracing::debug!(source = source_name.as_str(), count = options.len(), "loaded data source options");
    Ok(options)
}

pub async fn search_data_source_options(source_name: String, query: String) -> anyhow::Result<Vec<DataSourceOption>> {
    let options = list_data_source_options(source_name).await?;
    Ok(filter_options(options, &query))
}

/// Parses a stored option list, dropping blank values and repeated values.
pub fn parse_options(options_json: &str) -> anyhow::Result<Vec<DataSourceOption>> {
    let options: Vec<DataSourceOption> = serde_json::from_str(options_json)?;
    let mut present_values = HashSet::new();
    let mut result = Vec::with_capacity(options.len());
    for option in options {
        if option.value.trim().is_empty() || present_values.contains(&option.value) {
            continue;
        }
        present_values.insert(option.value.clone());
        result.push(option);
    }
    Ok(result)
}

/// Case-insensitive label match, capped at [`MAX_SUGGESTIONS`].
pub fn filter_options(options: Vec<DataSourceOption>, query: &str) -> Vec<DataSourceOption> {
    let needle = query.trim().to_lowercase();
    options
        .into_iter()
        .filter(|o| o.label.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drops_blank_and_duplicate_values() {
        let json = r#"[
            {"value": "170", "label": "Ada"},
            {"value": "", "label": "Nobody"},
            {"value": "170", "label": "Ada again"},
            {"value": "178", "label": "Grace"}
        ]"#;
        let options = parse_options(json).unwrap();
        assert_eq!(options, vec![DataSourceOption::new("170", "Ada"), DataSourceOption::new("178", "Grace")]);
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(parse_options("{\"value\": 1}").is_err());
    }

    #[test]
    fn filter_matches_labels_case_insensitively() {
        let options = vec![
            DataSourceOption::new("1", "Acme Corp"),
            DataSourceOption::new("2", "Globex"),
            DataSourceOption::new("3", "ACME Labs"),
        ];
        let matched = filter_options(options, " acme ");
        assert_eq!(matched.iter().map(|o| o.value.as_str()).collect::<Vec<_>>(), vec!["1", "3"]);
    }

    #[test]
    fn filter_caps_suggestions() {
        let options = (0..50).map(|i| DataSourceOption::plain(format!("acct {i}"))).collect();
        assert_eq!(filter_options(options, "acct").len(), MAX_SUGGESTIONS);
    }
}
