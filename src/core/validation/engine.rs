//! Validator chains and error aggregation for product drafts

use super::validators;
use crate::config::ValidationConfig;
use crate::core::field::{FieldKind, ProductField};
use crate::core::product::ProductDraft;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A single validator in a field chain
pub type FieldValidator = Arc<dyn Fn(&str, &str) -> Result<(), String> + Send + Sync>;

/// Ordered failing messages of one field
pub type ErrorList = Vec<String>;

/// Field name → ordered error messages
///
/// A field is valid iff its list is empty; the form is submittable iff every
/// list is empty. Serializes as a JSON object keyed by wire names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrorSet(IndexMap<ProductField, ErrorList>);

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the errors of one field
    pub fn set(&mut self, field: ProductField, errors: ErrorList) {
        self.0.insert(field, errors);
    }

    /// Errors of a field (empty when the field is valid or unknown)
    pub fn get(&self, field: ProductField) -> &[String] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_valid(&self, field: ProductField) -> bool {
        self.get(field).is_empty()
    }

    /// Whether no field carries an error
    pub fn is_submittable(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Number of fields carrying at least one error
    pub fn invalid_count(&self) -> usize {
        self.0.values().filter(|errors| !errors.is_empty()).count()
    }

    /// Fields carrying at least one error, in form order
    pub fn invalid_fields(&self) -> impl Iterator<Item = ProductField> + '_ {
        self.0
            .iter()
            .filter(|(_, errors)| !errors.is_empty())
            .map(|(field, _)| *field)
    }

    /// Remove every error
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductField, &[String])> {
        self.0.iter().map(|(field, errors)| (*field, errors.as_slice()))
    }
}

/// Per-field validator chains
///
/// `validate_all` is a pure function of the draft and is the only check that
/// gates submission; `validate_field` gives immediate per-keystroke feedback.
#[derive(Clone, Default)]
pub struct ValidationEngine {
    chains: IndexMap<ProductField, Vec<FieldValidator>>,
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chains: Vec<_> = self
            .chains
            .iter()
            .map(|(field, chain)| (field.as_str(), chain.len()))
            .collect();
        f.debug_struct("ValidationEngine")
            .field("chains", &chains)
            .finish()
    }
}

impl ValidationEngine {
    /// Engine without any chain, every field is optional
    pub fn new() -> Self {
        Self::default()
    }

    /// Product rules with the default configuration
    pub fn product() -> Self {
        Self::from_config(&ValidationConfig::default())
    }

    /// Product rules for the given configuration
    ///
    /// Required fields start with `required`; format checks follow according to
    /// the field kind. Optional text fields keep an empty chain.
    pub fn from_config(config: &ValidationConfig) -> Self {
        let mut engine = Self::new();

        for field in ProductField::ALL {
            if !field.is_required() {
                continue;
            }
            engine.register(field, validators::required());

            match field.kind() {
                FieldKind::Selection => {}
                FieldKind::Text => {
                    engine.register(field, validators::max_length(config.max_text_length));
                }
                FieldKind::Date => {
                    engine.register(field, validators::date_format(config.date_format.clone()));
                }
                FieldKind::Quantity => {
                    engine.register(field, validators::numeric());
                    engine.register(field, validators::non_negative());
                }
                FieldKind::Count => {
                    engine.register(field, validators::count());
                    engine.register(field, validators::non_negative());
                }
            }
        }

        engine
    }

    /// Append a validator to the chain of `field`
    pub fn register<F>(&mut self, field: ProductField, validator: F) -> &mut Self
    where
        F: Fn(&str, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.chains
            .entry(field)
            .or_default()
            .push(Arc::new(validator));
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_rule<F>(mut self, field: ProductField, validator: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.register(field, validator);
        self
    }

    /// Number of validators registered for `field`
    pub fn chain_len(&self, field: ProductField) -> usize {
        self.chains.get(&field).map_or(0, Vec::len)
    }

    /// Run the chain of `field` and collect every failing message in order
    pub fn validate_field(&self, field: ProductField, value: &str) -> ErrorList {
        let Some(chain) = self.chains.get(&field) else {
            return Vec::new();
        };

        chain
            .iter()
            .filter_map(|validator| (**validator)(field.label(), value).err())
            .collect()
    }

    /// Run every chain against the draft
    ///
    /// The result holds an entry for every field, empty for valid ones.
    pub fn validate_all(&self, draft: &ProductDraft) -> ValidationErrorSet {
        let mut errors = ValidationErrorSet::new();
        for field in ProductField::ALL {
            errors.set(field, self.validate_field(field, draft.get(field)));
        }
        errors
    }

    /// Whether the draft may be submitted
    pub fn can_submit(&self, draft: &ProductDraft) -> bool {
        draft.required_fields_filled() && self.validate_all(draft).is_submittable()
    }
}
