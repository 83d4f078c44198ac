//! Profession and document vocabularies
//!
//! Built from the `[catalog]` configuration section. Persisted
//! `document_templates` rows can be merged in on top of the configured
//! template names.

use crate::config::{CatalogConfig, ProfessionEntry};
use crate::domain::{DocumentTemplate, Profession};
use std::collections::BTreeMap;

/// Vocabularies used by forms, filters and the document panels
#[derive(Debug, Clone)]
pub struct Catalog {
    professions: Vec<ProfessionEntry>,
    document_categories: Vec<String>,
    templates: BTreeMap<String, Vec<String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

impl Catalog {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            professions: config.professions.clone(),
            document_categories: config.document_categories.clone(),
            templates: config.templates.clone(),
        }
    }

    /// Professions in display order
    pub fn professions(&self) -> &[ProfessionEntry] {
        &self.professions
    }

    /// Document categories in panel order
    pub fn document_categories(&self) -> &[String] {
        &self.document_categories
    }

    pub fn contains_profession(&self, value: &str) -> bool {
        self.professions.iter().any(|p| p.value == value)
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.document_categories.iter().any(|c| c == category)
    }

    /// Display label of a profession value
    ///
    /// Values outside the vocabulary are shown with `_` replaced by a space.
    pub fn profession_label(&self, profession: &Profession) -> String {
        self.professions
            .iter()
            .find(|p| p.value == profession.as_str())
            .map(|p| p.label.clone())
            .unwrap_or_else(|| profession.fallback_label())
    }

    /// Template names for a profession value; empty when it has none
    pub fn templates_for(&self, profession: &str) -> &[String] {
        self.templates
            .get(profession)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Template names keyed by profession value
    pub fn templates(&self) -> &BTreeMap<String, Vec<String>> {
        &self.templates
    }

    /// Adds persisted template rows to the configured names
    ///
    /// Names already listed for the profession are not repeated. Rows for a
    /// profession outside the vocabulary are kept under their raw value.
    pub fn with_persisted_templates(mut self, rows: &[DocumentTemplate]) -> Self {
        for row in rows {
            let names = self
                .templates
                .entry(row.profession.as_str().to_string())
                .or_default();
            if !names.iter().any(|n| n == &row.name) {
                names.push(row.name.clone());
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TemplateId;
    use chrono::Utc;

    fn template(name: &str, profession: &str) -> DocumentTemplate {
        DocumentTemplate {
            id: TemplateId::generate(),
            name: name.to_string(),
            profession: Profession::new(profession).unwrap(),
            template_content: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_vocabularies() {
        let catalog = Catalog::default();
        assert_eq!(catalog.professions().len(), 6);
        assert_eq!(catalog.document_categories().len(), 7);
        assert_eq!(catalog.document_categories()[0], "Médico");
        assert_eq!(catalog.document_categories()[6], "Geral");
        assert_eq!(catalog.templates_for("medicina").len(), 5);
        assert!(catalog.templates_for("nutricao").is_empty());
    }

    #[test]
    fn test_profession_label() {
        let catalog = Catalog::default();
        let nutricao = Profession::new("nutricao").unwrap();
        let unknown = Profession::new("terapia_da_fala").unwrap();
        assert_eq!(catalog.profession_label(&nutricao), "Nutrição");
        assert_eq!(catalog.profession_label(&unknown), "terapia da fala");
    }

    #[test]
    fn test_persisted_templates_merge_without_duplicates() {
        let catalog = Catalog::default().with_persisted_templates(&[
            template("Anamnese Médica", "medicina"),
            template("Laudo Médico", "medicina"),
            template("Plano Alimentar", "nutricao"),
        ]);

        let medicina = catalog.templates_for("medicina");
        assert_eq!(medicina.len(), 6);
        assert_eq!(medicina.last().map(String::as_str), Some("Laudo Médico"));
        assert_eq!(catalog.templates_for("nutricao"), ["Plano Alimentar".to_string()]);
    }
}
