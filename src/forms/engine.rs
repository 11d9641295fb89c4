use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::forms::record::{FieldName, FormRecord};
use crate::forms::rules::{rule_set, ErrorKind, Rule, RuleSet};

/// The first failing rule recorded for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn from_rule(rule: &Rule) -> Self {
        Self::new(rule.kind(), rule.message())
    }
}

/// Field to error mapping; a missing key means the field is currently valid.
///
/// Serializes as `{ "fieldName": "message" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: BTreeMap<FieldName, FieldError>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FieldName, error: FieldError) {
        self.entries.insert(field, error);
    }

    pub fn get(&self, field: FieldName) -> Option<&FieldError> {
        self.entries.get(&field)
    }

    pub fn message(&self, field: FieldName) -> Option<&str> {
        self.get(field).map(|error| error.message.as_str())
    }

    pub fn kind(&self, field: FieldName) -> Option<ErrorKind> {
        self.get(field).map(|error| error.kind)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.entries.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn fields(&self) -> Vec<FieldName> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &FieldError)> {
        self.entries.iter().map(|(field, error)| (*field, error))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops every entry whose field is not in `allowed`.
    pub fn retain_fields(&mut self, allowed: &[FieldName]) {
        self.entries.retain(|field, _| allowed.contains(field));
    }
}

impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, error) in &self.entries {
            map.serialize_entry(field.key(), &error.message)?;
        }
        map.end()
    }
}

/// Validates `fields` of `record` against the shared sign-up rules.
pub fn validate(fields: &[FieldName], record: &FormRecord) -> ErrorMap {
    validate_with(rule_set(), fields, record)
}

/// Validates `fields` of `record` against `rules`.
///
/// Each field reports only its first failing rule. Fields outside `fields`
/// are never evaluated and never appear in the result.
pub fn validate_with(rules: &RuleSet, fields: &[FieldName], record: &FormRecord) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for &field in fields {
        if let Some(rule) = rules
            .rules_for(field)
            .iter()
            .find(|rule| !rule.passes(field, record))
        {
            errors.insert(field, FieldError::from_rule(rule));
        }
    }
    tracing::debug!(
        checked = fields.len(),
        failed = errors.len(),
        "validated fields"
    );
    errors
}
