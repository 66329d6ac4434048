//! Route segments that carry structured state (base64 of CBOR).

use std::{fmt::Display, str::FromStr};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Wraps any serde type so it can sit in a route segment. The handoff to the
/// results page travels this way, so a reload of that page shows the same search.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UrlParam<T>(pub T);

impl<T> From<T> for UrlParam<T> {
    fn from(value: T) -> Self {
        UrlParam(value)
    }
}

impl<T> UrlParam<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Display the state in a way that can be parsed by FromStr
impl<T: Serialize> Display for UrlParam<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut serialized = Vec::new();
        if let Err(e) = ciborium::into_writer(&self.0, &mut serialized) {
            dioxus::logger::tracing::error!("Failed to serialize url param: {e}");
            return Ok(());
        }
        write!(f, "{}", URL_SAFE.encode(serialized))
    }
}

#[derive(Debug)]
pub enum StateParseError {
    DecodeError(base64::DecodeError),
    CiboriumError(ciborium::de::Error<std::io::Error>),
}

impl std::fmt::Display for StateParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeError(err) => write!(f, "Failed to decode base64: {}", err),
            Self::CiboriumError(err) => write!(f, "Failed to deserialize: {}", err),
        }
    }
}

impl std::error::Error for StateParseError {}

impl<T: for<'de> Deserialize<'de>> FromStr for UrlParam<T> {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = URL_SAFE
            .decode(s.as_bytes())
            .map_err(StateParseError::DecodeError)?;
        let parsed = ciborium::from_reader(std::io::Cursor::new(bytes))
            .map_err(StateParseError::CiboriumError)?;
        Ok(UrlParam(parsed))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use common::{contracts::ResultsHandoff, form_schema::SearchDomain, search_payload::SearchPayload};

    use super::*;

    #[test]
    fn handoff_survives_the_route_segment() {
        let fields = BTreeMap::from([("salesRep".to_string(), "IE=170~IE=178~".to_string())]);
        let handoff = ResultsHandoff {
            payload: SearchPayload::new(SearchDomain::Opportunity, fields, "advancedSearch", false),
            summary: "Sales Rep: 170, 178".to_string(),
            preserve_form_state: true,
        };
        let segment = UrlParam::from(handoff.clone()).to_string();
        assert!(!segment.contains('/'));
        let parsed: UrlParam<ResultsHandoff> = segment.parse().unwrap();
        assert_eq!(parsed.into_inner(), handoff);
    }

    #[test]
    fn garbage_segments_are_rejected() {
        assert!(matches!("%%%".parse::<UrlParam<ResultsHandoff>>(), Err(StateParseError::DecodeError(_))));
        let not_cbor = URL_SAFE.encode(b"\xff\xff");
        assert!(matches!(not_cbor.parse::<UrlParam<ResultsHandoff>>(), Err(StateParseError::CiboriumError(_))));
    }
}
