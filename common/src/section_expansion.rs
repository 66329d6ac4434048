//! Open/closed state of the form sections.

use std::collections::BTreeSet;

use crate::form_schema::FormConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionExpansion {
    canonical: Vec<String>,
    open: BTreeSet<String>,
}

impl SectionExpansion {
    /// Starts with every section closed.
    pub fn new(canonical: Vec<String>) -> Self {
        Self { canonical, open: BTreeSet::new() }
    }

    pub fn for_form(form: &FormConfig) -> Self {
        Self::new(form.section_ids())
    }

    /// Ids outside the canonical list are ignored.
    pub fn toggle(&mut self, id: &str) {
        if !self.canonical.iter().any(|c| c == id) {
            tracing::warn!(section = id, "toggle for unknown section ignored");
            return;
        }
        if !self.open.remove(id) {
            self.open.insert(id.to_string());
        }
    }

    pub fn expand_all(&mut self) {
        self.open = self.canonical.iter().cloned().collect();
    }

    pub fn collapse_all(&mut self) {
        self.open.clear();
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    /// True only when every canonical section is open.
    pub fn is_expanded(&self) -> bool {
        self.open.len() == self.canonical.len() && self.canonical.iter().all(|id| self.open.contains(id))
    }

    /// Open section ids in canonical order.
    pub fn open_sections(&self) -> Vec<&str> {
        self.canonical
            .iter()
            .filter(|id| self.open.contains(id.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn canonical(&self) -> &[String] {
        &self.canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_schema::SearchDomain;

    #[test]
    fn toggle_adds_then_removes() {
        let mut expansion = SectionExpansion::new(vec!["a".into(), "b".into()]);
        expansion.toggle("a");
        assert!(expansion.is_open("a"));
        assert!(!expansion.is_expanded());
        expansion.toggle("b");
        assert!(expansion.is_expanded());
        expansion.toggle("a");
        assert!(!expansion.is_open("a"));
        assert_eq!(expansion.open_sections(), vec!["b"]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut expansion = SectionExpansion::new(vec!["a".into()]);
        expansion.toggle("zzz");
        assert!(expansion.open_sections().is_empty());
    }

    #[test]
    fn expand_all_opens_the_domain_sections() {
        let opportunity = FormConfig::for_domain(SearchDomain::Opportunity);
        let mut expansion = SectionExpansion::for_form(opportunity);
        expansion.expand_all();
        assert!(expansion.is_expanded());
        assert_eq!(expansion.open_sections().len(), 8);
        expansion.collapse_all();
        assert!(!expansion.is_expanded());
        assert!(expansion.open_sections().is_empty());

        let mut expansion = SectionExpansion::for_form(FormConfig::for_domain(SearchDomain::Proposal));
        expansion.expand_all();
        assert_eq!(expansion.open_sections(), vec!["details", "client", "owners", "status"]);
        assert!(expansion.is_expanded());
    }
}
