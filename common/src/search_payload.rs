//! The outgoing search payload: building, validating and summarising it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    filter_codec::{FragmentKind, decode_for, encode_value, is_emptiness_sentinel, tokenize},
    form_schema::{FormConfig, SearchDomain},
    search_const::FRAGMENT_TERMINATOR,
    search_state::SearchState,
};

/// Field name -> wire token.
pub type EncodedFieldMap = BTreeMap<String, String>;

/// Fully encoded search, a pure projection of the search state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPayload {
    pub domain: SearchDomain,
    pub fields: EncodedFieldMap,
    pub page_type: String,
    pub is_recent_search: bool,
}

impl SearchPayload {
    pub fn new(domain: SearchDomain, fields: EncodedFieldMap, page_type: impl Into<String>, is_recent_search: bool) -> Self {
        Self { domain, fields, page_type: page_type.into(), is_recent_search }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `{ "<domain>Search": {..}, "pageType": .., "isRecentSearch": .. }`
    pub fn to_wire(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(self.domain.payload_key().to_string(), json!(self.fields));
        body.insert("pageType".to_string(), json!(self.page_type));
        body.insert("isRecentSearch".to_string(), json!(self.is_recent_search));
        serde_json::Value::Object(body)
    }

    pub fn from_wire(value: &serde_json::Value) -> anyhow::Result<Self> {
        let Some(body) = value.as_object() else {
            anyhow::bail!("search payload is not a JSON object");
        };
        let Some((domain, fields)) = SearchDomain::ALL
            .into_iter()
            .find_map(|d| body.get(d.payload_key()).map(|f| (d, f)))
        else {
            anyhow::bail!("search payload has no domain search body");
        };
        let fields: EncodedFieldMap = serde_json::from_value(fields.clone())?;
        let page_type = body.get("pageType").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let is_recent_search = body.get("isRecentSearch").and_then(|v| v.as_bool()).unwrap_or(false);
        Ok(Self { domain, fields, page_type, is_recent_search })
    }
}

/// Encodes every field of the state with its schema encoding.
/// Fields the form does not know are skipped.
pub fn encode_state(state: &SearchState, form: &FormConfig) -> EncodedFieldMap {
    let mut encoded = EncodedFieldMap::new();
    for (field_name, value) in state.iter() {
        let Some(field) = form.field(field_name) else {
            tracing::debug!(field = field_name.as_str(), domain = %form.domain, "skipping field outside the form");
            continue;
        };
        encoded.insert(field_name.clone(), encode_value(value, field.encoding()));
    }
    encoded
}

/// Wraps already-encoded field values into the domain body.
pub trait PayloadBuilder {
    fn build(&self, field_map: &EncodedFieldMap, domain: SearchDomain) -> EncodedFieldMap;
}

/// Drops blank tokens and fields the domain form does not define.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainPayloadBuilder;

impl PayloadBuilder for DomainPayloadBuilder {
    fn build(&self, field_map: &EncodedFieldMap, domain: SearchDomain) -> EncodedFieldMap {
        let form = FormConfig::for_domain(domain);
        field_map
            .iter()
            .filter(|(name, token)| !token.trim().is_empty() && form.field(name).is_some())
            .map(|(name, token)| (name.clone(), token.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { is_valid: errors.is_empty(), errors }
    }
}

pub trait PayloadValidator {
    fn validate(&self, payload: &SearchPayload) -> ValidationReport;
}

/// Checks the payload is complete and every token is well formed for its field.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl PayloadValidator for StructuralValidator {
    fn validate(&self, payload: &SearchPayload) -> ValidationReport {
        let form = FormConfig::for_domain(payload.domain);
        let mut errors = Vec::new();

        if payload.page_type.trim().is_empty() {
            errors.push("page type is missing".to_string());
        }

        for (field_name, token) in &payload.fields {
            let Some(field) = form.field(field_name) else {
                errors.push(format!("{field_name}: not a {} filter", payload.domain));
                continue;
            };
            if field.encoding().fragment_kind().is_none() {
                if token.contains(FRAGMENT_TERMINATOR) {
                    errors.push(format!("{field_name}: plain list contains a fragment terminator"));
                }
                continue;
            }
            match tokenize(token) {
                Ok(fragments) if fragments.is_empty() => {
                    errors.push(format!("{field_name}: empty token"));
                }
                Ok(fragments) => {
                    let kinds: BTreeSet<_> = fragments.iter().map(|f| f.kind).collect();
                    let has_sentinel = kinds.iter().any(|k| k.is_emptiness());
                    if kinds.len() > 1 || (has_sentinel && fragments.len() > 1) {
                        errors.push(format!("{field_name}: mixes predicate kinds"));
                    }
                }
                Err(e) => errors.push(format!("{field_name}: {e}")),
            }
        }

        ValidationReport::from_errors(errors)
    }
}

/// "Label: v1, v2; Label: v3", in form order.
pub fn summarize(payload: &SearchPayload, form: &FormConfig) -> String {
    let parts: Vec<String> = form
        .fields()
        .filter_map(|field| {
            let token = payload.fields.get(&field.field_name)?;
            let values: Vec<String> = decode_for(token, field.encoding())
                .into_iter()
                .map(|v| sentinel_label(&v).unwrap_or(v))
                .collect();
            if values.is_empty() {
                return None;
            }
            Some(format!("{}: {}", field.label, values.join(", ")))
        })
        .collect();
    if parts.is_empty() {
        format!("All {}", payload.domain.display_name().to_lowercase())
    } else {
        parts.join("; ")
    }
}

fn sentinel_label(value: &str) -> Option<String> {
    if !is_emptiness_sentinel(value) {
        return None;
    }
    let fragments = tokenize(value).ok()?;
    let last = fragments.last()?;
    match last.kind {
        FragmentKind::IsEmpty | FragmentKind::IsNotEmpty => Some(last.value.clone()),
        FragmentKind::Identifier | FragmentKind::StartsWith => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter_codec::FilterValue, search_const::DEFAULT_PAGE_TYPE};

    fn payload(fields: &[(&str, &str)]) -> SearchPayload {
        let fields = fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        SearchPayload::new(SearchDomain::Opportunity, fields, DEFAULT_PAGE_TYPE, false)
    }

    #[test]
    fn wire_shape_is_domain_tagged() {
        let p = payload(&[("stage", "IE=1~")]);
        let wire = p.to_wire();
        assert_eq!(wire["opportunitySearch"]["stage"], "IE=1~");
        assert_eq!(wire["pageType"], DEFAULT_PAGE_TYPE);
        assert_eq!(wire["isRecentSearch"], false);
        assert_eq!(SearchPayload::from_wire(&wire).unwrap(), p);
    }

    #[test]
    fn from_wire_rejects_missing_body() {
        assert!(SearchPayload::from_wire(&json!({"pageType": "x"})).is_err());
        assert!(SearchPayload::from_wire(&json!([1, 2])).is_err());
    }

    #[test]
    fn encode_state_uses_field_encodings() {
        let form = FormConfig::for_domain(SearchDomain::Opportunity);
        let mut state = SearchState::default();
        state.insert("stage", FilterValue::Multi(vec!["170".into(), "178".into()]));
        state.insert("opportunityName", FilterValue::Single("Acme".into()));
        state.insert("source", FilterValue::Multi(vec!["Web".into(), "Referral".into()]));
        state.insert("unknown", FilterValue::Single("x".into()));
        let encoded = encode_state(&state, form);
        assert_eq!(encoded.get("stage").map(String::as_str), Some("IE=170~IE=178~"));
        assert_eq!(encoded.get("opportunityName").map(String::as_str), Some("SW=Acme~"));
        assert_eq!(encoded.get("source").map(String::as_str), Some("Web,Referral"));
        assert!(!encoded.contains_key("unknown"));
    }

    #[test]
    fn builder_drops_blank_and_foreign_fields() {
        let mut map = EncodedFieldMap::new();
        map.insert("stage".into(), "IE=1~".into());
        map.insert("salesRep".into(), "".into());
        map.insert("proposalTitle".into(), "SW=x~".into());
        let built = DomainPayloadBuilder.build(&map, SearchDomain::Opportunity);
        assert_eq!(built.len(), 1);
        assert!(built.contains_key("stage"));
    }

    #[test]
    fn validator_accepts_well_formed_payload() {
        let p = payload(&[("stage", "IE=1~IE=2~"), ("amount", "IN=Is Empty~"), ("source", "Web,Referral")]);
        let report = StructuralValidator.validate(&p);
        assert!(report.is_valid, "{:?}", report.errors);
    }

    #[test]
    fn validator_reports_every_problem() {
        let mut p = payload(&[
            ("stage", "IE=1~SW=2~"),
            ("amount", "IN=Is Empty~SW=5~"),
            ("region", "IE=1"),
            ("source", "IE=Web~"),
            ("proposalTitle", "SW=x~"),
        ]);
        p.page_type = String::new();
        let report = StructuralValidator.validate(&p);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 6);
    }

    #[test]
    fn summary_follows_form_order() {
        let form = FormConfig::for_domain(SearchDomain::Opportunity);
        let p = payload(&[("stage", "IE=Won~IE=Lost~"), ("opportunityName", "SW=Acme~"), ("amount", "INN=Is Not Empty~")]);
        assert_eq!(summarize(&p, form), "Opportunity Name: Acme; Stage: Won, Lost; Amount: Is Not Empty");
        assert_eq!(summarize(&payload(&[]), form), "All opportunities");
    }
}
