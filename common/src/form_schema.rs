//! Declarative description of the filter form, one config per search domain.

use std::{collections::BTreeSet, fmt::Display, str::FromStr, sync::OnceLock};

use serde::{Deserialize, Serialize};

use crate::{
    filter_codec::{FilterEncoding, is_empty_token, is_not_empty_token},
    search_const::{IS_EMPTY_LABEL, IS_NOT_EMPTY_LABEL},
};

/// The named context a search runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SearchDomain {
    #[default]
    Opportunity,
    Proposal,
}

impl SearchDomain {
    pub const ALL: [SearchDomain; 2] = [SearchDomain::Opportunity, SearchDomain::Proposal];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchDomain::Opportunity => "opportunity",
            SearchDomain::Proposal => "proposal",
        }
    }

    /// Key the encoded field map is wrapped under, e.g. `opportunitySearch`.
    pub fn payload_key(self) -> &'static str {
        match self {
            SearchDomain::Opportunity => "opportunitySearch",
            SearchDomain::Proposal => "proposalSearch",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SearchDomain::Opportunity => "Opportunities",
            SearchDomain::Proposal => "Proposals",
        }
    }
}

impl Display for SearchDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParseError(pub String);

impl Display for DomainParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown search domain: {:?}", self.0)
    }
}

impl std::error::Error for DomainParseError {}

impl FromStr for SearchDomain {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchDomain::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainParseError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Text,
    SingleSelect,
    MultiSelect,
    Autocomplete,
    /// Free text plus the "is empty" / "is not empty" options.
    Composite,
}

impl ComponentKind {
    pub fn default_encoding(self) -> FilterEncoding {
        match self {
            ComponentKind::Text => FilterEncoding::StartsWith,
            ComponentKind::SingleSelect => FilterEncoding::Identifier,
            ComponentKind::MultiSelect => FilterEncoding::Identifier,
            ComponentKind::Autocomplete => FilterEncoding::Identifier,
            ComponentKind::Composite => FilterEncoding::StartsWith,
        }
    }

    /// Kinds whose selections toggle in and out of a list.
    pub fn accumulates_selections(self) -> bool {
        match self {
            ComponentKind::MultiSelect | ComponentKind::Autocomplete => true,
            ComponentKind::Text | ComponentKind::SingleSelect | ComponentKind::Composite => false,
        }
    }
}

/// One entry of a select-style field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataSourceOption {
    pub value: String,
    pub label: String,
}

impl DataSourceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }

    /// Option whose value and label are the same string.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self { label: value.clone(), value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub field_name: String,
    pub label: String,
    pub component_kind: ComponentKind,
    #[serde(default)]
    pub data_source_name: Option<String>,
    #[serde(default)]
    pub static_options: Option<Vec<DataSourceOption>>,
    #[serde(default)]
    pub placeholder: Option<String>,
    pub column_span: u16,
    /// Overrides the kind's default encoding.
    #[serde(default)]
    pub encoding: Option<FilterEncoding>,
}

impl FieldSchema {
    pub fn new(field_name: impl Into<String>, label: impl Into<String>, component_kind: ComponentKind, column_span: u16) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
            component_kind,
            data_source_name: None,
            static_options: None,
            placeholder: None,
            column_span,
            encoding: None,
        }
    }

    pub fn with_data_source(mut self, source_name: impl Into<String>) -> Self {
        self.data_source_name = Some(source_name.into());
        self
    }

    pub fn with_static_options(mut self, options: Vec<DataSourceOption>) -> Self {
        self.static_options = Some(options);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_encoding(mut self, encoding: FilterEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn encoding(&self) -> FilterEncoding {
        self.encoding.unwrap_or(self.component_kind.default_encoding())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSchema {
    pub id: String,
    pub title: String,
    pub color_tag: String,
    pub fields: Vec<FieldSchema>,
}

impl SectionSchema {
    pub fn new(id: impl Into<String>, title: impl Into<String>, color_tag: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self { id: id.into(), title: title.into(), color_tag: color_tag.into(), fields }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    pub domain: SearchDomain,
    pub sections: Vec<SectionSchema>,
}

impl FormConfig {
    /// The built-in form for a domain, constructed once per process.
    pub fn for_domain(domain: SearchDomain) -> &'static FormConfig {
        static OPPORTUNITY: OnceLock<FormConfig> = OnceLock::new();
        static PROPOSAL: OnceLock<FormConfig> = OnceLock::new();
        match domain {
            SearchDomain::Opportunity => OPPORTUNITY.get_or_init(|| checked(opportunity_form())),
            SearchDomain::Proposal => PROPOSAL.get_or_init(|| checked(proposal_form())),
        }
    }

    fn check_unique_names(&self) -> anyhow::Result<()> {
        let mut section_ids = BTreeSet::new();
        let mut field_names = BTreeSet::new();
        for section in &self.sections {
            if !section_ids.insert(section.id.as_str()) {
                anyhow::bail!("duplicate section id {:?} in {} form", section.id, self.domain);
            }
            for field in &section.fields {
                if !field_names.insert(field.field_name.as_str()) {
                    anyhow::bail!("duplicate field {:?} in {} form", field.field_name, self.domain);
                }
            }
        }
        Ok(())
    }

    /// Canonical section order, used for "expand all".
    pub fn section_ids(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, field_name: &str) -> Option<&FieldSchema> {
        self.fields().find(|f| f.field_name == field_name)
    }

    pub fn section(&self, id: &str) -> Option<&SectionSchema> {
        self.sections.iter().find(|s| s.id == id)
    }
}

fn emptiness_options() -> Vec<DataSourceOption> {
    vec![
        DataSourceOption::new(is_empty_token(), IS_EMPTY_LABEL),
        DataSourceOption::new(is_not_empty_token(), IS_NOT_EMPTY_LABEL),
    ]
}

fn plain_options(values: &[&str]) -> Vec<DataSourceOption> {
    values.iter().map(|v| DataSourceOption::plain(*v)).collect()
}

fn checked(config: FormConfig) -> FormConfig {
    if let Err(e) = config.check_unique_names() {
        tracing::error!(error = %e, "built-in form has clashing names");
    }
    config
}

fn opportunity_form() -> FormConfig {
    use ComponentKind::{Autocomplete, Composite, MultiSelect, SingleSelect, Text};

    let all_reps = || vec![DataSourceOption::new("All Reps", "All Reps")];
    FormConfig {
        domain: SearchDomain::Opportunity,
        sections: vec![
            SectionSchema::new("details", "Opportunity Details", "blue", vec![
                FieldSchema::new("opportunityName", "Opportunity Name", Text, 6).with_placeholder("Starts with..."),
                FieldSchema::new("opportunityType", "Type", MultiSelect, 3).with_data_source("opportunityTypes"),
                FieldSchema::new("priority", "Priority", SingleSelect, 3)
                    .with_static_options(plain_options(&["All", "High", "Medium", "Low"])),
            ]),
            SectionSchema::new("account", "Account", "indigo", vec![
                FieldSchema::new("accountId", "Account", Autocomplete, 6)
                    .with_data_source("accounts")
                    .with_placeholder("Type 3 or more characters"),
                FieldSchema::new("industry", "Industry", MultiSelect, 3).with_data_source("industries"),
                FieldSchema::new("region", "Region", MultiSelect, 3).with_data_source("regions"),
            ]),
            SectionSchema::new("ownership", "Ownership", "teal", vec![
                FieldSchema::new("salesRep", "Sales Rep", MultiSelect, 4)
                    .with_data_source("salesReps")
                    .with_static_options(all_reps()),
                FieldSchema::new("accountManager", "Account Manager", MultiSelect, 4)
                    .with_data_source("salesReps")
                    .with_static_options(all_reps()),
                FieldSchema::new("salesTeam", "Team", SingleSelect, 4).with_data_source("salesTeams"),
            ]),
            SectionSchema::new("pipeline", "Stage & Pipeline", "green", vec![
                FieldSchema::new("stage", "Stage", MultiSelect, 4).with_data_source("stages"),
                FieldSchema::new("forecastCategory", "Forecast Category", MultiSelect, 4)
                    .with_static_options(plain_options(&["Pipeline", "Best Case", "Commit", "Closed", "Omitted"])),
                FieldSchema::new("probability", "Probability", SingleSelect, 4)
                    .with_static_options(plain_options(&["All", "0-25", "25-50", "50-75", "75-100"])),
            ]),
            SectionSchema::new("financials", "Financials", "amber", vec![
                FieldSchema::new("amount", "Amount", Composite, 6)
                    .with_static_options(emptiness_options())
                    .with_placeholder("Starts with..."),
                FieldSchema::new("currency", "Currency", SingleSelect, 3)
                    .with_static_options(plain_options(&["All", "USD", "EUR", "GBP"])),
                FieldSchema::new("discountBand", "Discount", MultiSelect, 3)
                    .with_static_options(plain_options(&["None", "Up to 10%", "10-25%", "Over 25%"])),
            ]),
            SectionSchema::new("dates", "Key Dates", "orange", vec![
                FieldSchema::new("closeQuarter", "Close Quarter", MultiSelect, 4).with_data_source("fiscalQuarters"),
                FieldSchema::new("createdQuarter", "Created Quarter", MultiSelect, 4).with_data_source("fiscalQuarters"),
                FieldSchema::new("lastActivity", "Last Activity", SingleSelect, 4)
                    .with_static_options(plain_options(&["All", "Last 7 days", "Last 30 days", "Last 90 days"])),
            ]),
            SectionSchema::new("products", "Products & Services", "purple", vec![
                FieldSchema::new("productLine", "Product Line", MultiSelect, 6).with_data_source("productLines"),
                FieldSchema::new("competitor", "Competitor", Composite, 6)
                    .with_static_options(emptiness_options())
                    .with_placeholder("Starts with..."),
            ]),
            SectionSchema::new("source", "Lead Source", "gray", vec![
                FieldSchema::new("source", "Source", MultiSelect, 6)
                    .with_data_source("leadSources")
                    .with_encoding(FilterEncoding::PlainList),
                FieldSchema::new("campaign", "Campaign", Autocomplete, 6)
                    .with_data_source("campaigns")
                    .with_placeholder("Type 3 or more characters"),
                FieldSchema::new("partner", "Partner", Composite, 12)
                    .with_static_options(emptiness_options()),
            ]),
        ],
    }
}

fn proposal_form() -> FormConfig {
    use ComponentKind::{Autocomplete, Composite, MultiSelect, Text};

    FormConfig {
        domain: SearchDomain::Proposal,
        sections: vec![
            SectionSchema::new("details", "Proposal Details", "blue", vec![
                FieldSchema::new("proposalTitle", "Title", Text, 6).with_placeholder("Starts with..."),
                FieldSchema::new("proposalNumber", "Number", Text, 3).with_encoding(FilterEncoding::Identifier),
                FieldSchema::new("proposalType", "Type", MultiSelect, 3).with_data_source("proposalTypes"),
            ]),
            SectionSchema::new("client", "Client", "indigo", vec![
                FieldSchema::new("accountId", "Client", Autocomplete, 6)
                    .with_data_source("accounts")
                    .with_placeholder("Type 3 or more characters"),
                FieldSchema::new("clientContact", "Contact", Composite, 6)
                    .with_static_options(emptiness_options()),
            ]),
            SectionSchema::new("owners", "Owners", "teal", vec![
                FieldSchema::new("preparedBy", "Prepared By", MultiSelect, 6)
                    .with_data_source("salesReps")
                    .with_static_options(vec![DataSourceOption::new("All Reps", "All Reps")]),
                FieldSchema::new("approver", "Approver", MultiSelect, 6).with_data_source("approvers"),
            ]),
            SectionSchema::new("status", "Status", "green", vec![
                FieldSchema::new("proposalStatus", "Status", MultiSelect, 4)
                    .with_static_options(plain_options(&["All", "Draft", "Submitted", "Won", "Lost"])),
                FieldSchema::new("submissionQuarter", "Submitted In", MultiSelect, 4).with_data_source("fiscalQuarters"),
                FieldSchema::new("source", "Source", MultiSelect, 4)
                    .with_data_source("leadSources")
                    .with_encoding(FilterEncoding::PlainList),
            ]),
        ],
    }
}
