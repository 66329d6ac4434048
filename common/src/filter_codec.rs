//! Translation between raw filter selections and the backend token grammar.
//!
//! A wire token is a concatenation of self-terminated fragments such as
//! `IE=170~IE=178~`. Identifier (`IE=`) and starts-with (`SW=`) fragments carry
//! values and form an OR-set; `IN=` / `INN=` fragments are the "is empty" /
//! "is not empty" sentinels. A handful of fields skip the grammar entirely and
//! use a comma-joined list instead.

use serde::{Deserialize, Serialize};

use crate::search_const::{
    ALL_SENTINELS, FRAGMENT_TERMINATOR, IDENTIFIER_PREFIX, IS_EMPTY_LABEL, IS_EMPTY_PREFIX,
    IS_NOT_EMPTY_LABEL, IS_NOT_EMPTY_PREFIX, PLAIN_LIST_SEPARATOR, STARTS_WITH_PREFIX,
};

/// How a field's selections are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterEncoding {
    /// `IE=<value>~` per selection.
    Identifier,
    /// `SW=<value>~` per selection.
    StartsWith,
    /// `a,b,c` with no grammar at all.
    PlainList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FragmentKind {
    Identifier,
    StartsWith,
    IsEmpty,
    IsNotEmpty,
}

impl FragmentKind {
    // INN= before IN= so the longer prefix wins at a fragment boundary.
    const SCAN_ORDER: [FragmentKind; 4] = [
        FragmentKind::IsNotEmpty,
        FragmentKind::IsEmpty,
        FragmentKind::Identifier,
        FragmentKind::StartsWith,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            FragmentKind::Identifier => IDENTIFIER_PREFIX,
            FragmentKind::StartsWith => STARTS_WITH_PREFIX,
            FragmentKind::IsEmpty => IS_EMPTY_PREFIX,
            FragmentKind::IsNotEmpty => IS_NOT_EMPTY_PREFIX,
        }
    }

    pub fn is_emptiness(self) -> bool {
        matches!(self, FragmentKind::IsEmpty | FragmentKind::IsNotEmpty)
    }
}

impl FilterEncoding {
    /// The fragment kind raw values are wrapped in, if the encoding uses the grammar.
    pub fn fragment_kind(self) -> Option<FragmentKind> {
        match self {
            FilterEncoding::Identifier => Some(FragmentKind::Identifier),
            FilterEncoding::StartsWith => Some(FragmentKind::StartsWith),
            FilterEncoding::PlainList => None,
        }
    }
}

/// One predicate unit of a wire token, e.g. `IE=170~`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub value: String,
}

impl Fragment {
    pub fn new(kind: FragmentKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }

    pub fn to_token(&self) -> String {
        format!("{}{}{}", self.kind.prefix(), self.value, FRAGMENT_TERMINATOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    UnknownPrefix { offset: usize },
    Unterminated { offset: usize },
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPrefix { offset } => write!(f, "no known fragment prefix at byte {}", offset),
            Self::Unterminated { offset } => write!(f, "fragment starting at byte {} has no terminator", offset),
        }
    }
}

impl std::error::Error for TokenizeError {}

/// Walks `token` fragment by fragment. Returns the fragments read before the
/// first stray byte, and the error at that byte if there was one.
fn scan(token: &str) -> (Vec<Fragment>, Result<(), TokenizeError>) {
    let mut fragments = Vec::new();
    let mut rest = token;
    let mut offset = 0;
    while !rest.is_empty() {
        let Some(kind) = FragmentKind::SCAN_ORDER.into_iter().find(|kind| rest.starts_with(kind.prefix())) else {
            return (fragments, Err(TokenizeError::UnknownPrefix { offset }));
        };
        let body = &rest[kind.prefix().len()..];
        let Some(end) = body.find(FRAGMENT_TERMINATOR) else {
            return (fragments, Err(TokenizeError::Unterminated { offset }));
        };
        fragments.push(Fragment::new(kind, &body[..end]));

        let consumed = kind.prefix().len() + end + FRAGMENT_TERMINATOR.len_utf8();
        rest = &rest[consumed..];
        offset += consumed;
    }
    (fragments, Ok(()))
}

/// Splits a token into fragments. The whole token must be fragments; any stray
/// text is an error. The empty token is zero fragments.
pub fn tokenize(token: &str) -> Result<Vec<Fragment>, TokenizeError> {
    let (fragments, outcome) = scan(token);
    outcome.map(|_| fragments)
}

/// The well-formed fragments at the start of `token`, ignoring whatever follows.
pub fn leading_fragments(token: &str) -> Vec<Fragment> {
    scan(token).0
}

/// True when `value` starts with a known prefix and ends with the terminator.
/// Such values are never wrapped again.
pub fn is_encoded(value: &str) -> bool {
    FragmentKind::SCAN_ORDER.iter().any(|kind| value.starts_with(kind.prefix()))
        && value.ends_with(FRAGMENT_TERMINATOR)
}

pub fn is_all_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || ALL_SENTINELS.contains(&value)
}

/// True for `IN=..~` / `INN=..~` tokens.
pub fn is_emptiness_sentinel(value: &str) -> bool {
    match tokenize(value.trim()) {
        Ok(fragments) => !fragments.is_empty() && fragments.iter().all(|f| f.kind.is_emptiness()),
        Err(_) => false,
    }
}

pub fn is_empty_token() -> String {
    Fragment::new(FragmentKind::IsEmpty, IS_EMPTY_LABEL).to_token()
}

pub fn is_not_empty_token() -> String {
    Fragment::new(FragmentKind::IsNotEmpty, IS_NOT_EMPTY_LABEL).to_token()
}

fn wrap(value: &str, kind: FragmentKind) -> String {
    if is_encoded(value) {
        return value.to_string();
    }
    let value: String = value.chars().filter(|c| *c != FRAGMENT_TERMINATOR).collect();
    Fragment::new(kind, value).to_token()
}

/// Encodes raw selections for a field.
///
/// Blank entries are dropped and the rest trimmed. Any "All" sentinel collapses
/// the field to the empty string. An emptiness sentinel excludes value
/// fragments, so only the last one is kept. Already-encoded values are passed
/// through untouched.
pub fn encode<S: AsRef<str>>(values: &[S], encoding: FilterEncoding) -> String {
    let cleaned: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .collect();

    if cleaned.iter().any(|v| is_all_sentinel(v)) {
        return String::new();
    }

    let kind = match encoding.fragment_kind() {
        Some(kind) => kind,
        None => return cleaned.join(PLAIN_LIST_SEPARATOR),
    };

    let values: Vec<String> = cleaned.iter().map(|v| collapse_emptiness(v)).collect();
    if let Some(sentinel) = values.iter().rev().find(|v| is_emptiness_sentinel(v)) {
        return sentinel.clone();
    }

    values.iter().map(|v| wrap(v, kind)).collect()
}

/// An encoded value carrying an emptiness fragment stands for that sentinel
/// alone; any value fragments next to it are dropped.
fn collapse_emptiness(value: &str) -> String {
    let sentinel = is_encoded(value)
        .then(|| leading_fragments(value).into_iter().rev().find(|f| f.kind.is_emptiness()))
        .flatten();
    sentinel.map_or_else(|| value.to_string(), |f| f.to_token())
}

pub fn encode_value(value: &FilterValue, encoding: FilterEncoding) -> String {
    match value {
        FilterValue::Single(s) => encode(std::slice::from_ref(s), encoding),
        FilterValue::Multi(values) => encode(values, encoding),
        FilterValue::Encoded(token) => token.trim().to_string(),
    }
}

/// Recovers raw selections from a token.
///
/// Identifier fragments win over starts-with fragments. A token with stray
/// text after its last well-formed fragment still yields the values read up
/// to that point. A token that does not start with grammar is split on
/// commas, and anything else comes back as a single literal. Emptiness
/// sentinels come back verbatim so they re-encode to themselves.
pub fn decode(token: &str) -> Vec<String> {
    let token = token.trim();
    if token.is_empty() {
        return Vec::new();
    }

    let (fragments, outcome) = scan(token);
    if let Some(values) = fragment_values(&fragments) {
        return values;
    }
    if outcome.is_ok() {
        return vec![token.to_string()];
    }

    if token.contains(PLAIN_LIST_SEPARATOR) {
        return split_plain_list(token);
    }
    vec![token.to_string()]
}

fn fragment_values(fragments: &[Fragment]) -> Option<Vec<String>> {
    [FragmentKind::Identifier, FragmentKind::StartsWith].into_iter().find_map(|kind| {
        let values: Vec<String> = fragments
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.value.clone())
            .collect();
        (!values.is_empty()).then_some(values)
    })
}

/// Like [`decode`], but plain-list fields always take the comma path.
pub fn decode_for(token: &str, encoding: FilterEncoding) -> Vec<String> {
    match encoding {
        FilterEncoding::PlainList => split_plain_list(token),
        FilterEncoding::Identifier | FilterEncoding::StartsWith => decode(token),
    }
}

fn split_plain_list(token: &str) -> Vec<String> {
    token
        .split(PLAIN_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// The value held for one field in UI state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    Single(String),
    Multi(Vec<String>),
    /// Already a wire token, e.g. restored from a saved search.
    Encoded(String),
}

impl FilterValue {
    /// The raw selections this value stands for.
    pub fn selections(&self, encoding: FilterEncoding) -> Vec<String> {
        match self {
            FilterValue::Single(s) if s.trim().is_empty() => Vec::new(),
            FilterValue::Single(s) => vec![s.trim().to_string()],
            FilterValue::Multi(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect(),
            FilterValue::Encoded(token) => decode_for(token, encoding),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Single(s) | FilterValue::Encoded(s) => s.trim().is_empty(),
            FilterValue::Multi(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }
}
