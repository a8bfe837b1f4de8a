use std::collections::BTreeMap;

use crate::domain::{FieldId, FieldSpec, FieldType, ResponseSet, ResponseValue};

/// The one message every required-field failure surfaces.
pub const REQUIRED_MESSAGE: &str = "This field is required";

// ---------------------------------------------------------------------------
// ValidationReport — per-field failures, empty means submittable
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<FieldId, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message(&self, id: &FieldId) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &str)> {
        self.errors.iter().map(|(id, msg)| (id, msg.as_str()))
    }

    pub(crate) fn insert(&mut self, id: FieldId, message: impl Into<String>) {
        self.errors.insert(id, message.into());
    }
}

// ---------------------------------------------------------------------------
// validate_responses — pure validation (no IO, no side effects)
// ---------------------------------------------------------------------------

/// Validates a response set against an ordered field schema.
///
/// Two passes:
/// 1. Conditional activation: a field with a conditional is active iff the
///    referenced field's response equals the trigger value. Inactive fields
///    always pass. Active conditional fields take their required flag from
///    the conditional.
/// 2. Per-field required check, independent per field. A `false` boolean and
///    a `0` rating are defined values and pass; only a missing response, an
///    empty string, or an incomplete signature fail.
pub fn validate_responses(fields: &[FieldSpec], responses: &ResponseSet) -> ValidationReport {
    let mut report = ValidationReport::default();
    for field in fields {
        if !effective_required(field, responses) {
            continue;
        }
        if !satisfies_required(field.field_type, responses.get(&field.id)) {
            report.insert(field.id.clone(), REQUIRED_MESSAGE);
        }
    }
    report
}

/// Whether a field participates in validation at all.
pub fn is_active(field: &FieldSpec, responses: &ResponseSet) -> bool {
    match &field.conditional {
        None => true,
        Some(cond) => responses
            .get(&cond.field)
            .is_some_and(|value| value.matches_json(&cond.equals)),
    }
}

/// The required flag after conditional evaluation: inactive fields are never
/// required, active conditional fields use the conditional's flag.
pub fn effective_required(field: &FieldSpec, responses: &ResponseSet) -> bool {
    match &field.conditional {
        None => field.required,
        Some(cond) => is_active(field, responses) && cond.required,
    }
}

fn satisfies_required(field_type: FieldType, value: Option<&ResponseValue>) -> bool {
    let Some(value) = value else {
        return false;
    };
    match field_type {
        FieldType::Signature => value.as_signature().is_some_and(|sig| sig.is_complete()),
        _ => match value {
            ResponseValue::Text(s) => !s.is_empty(),
            // Bool(false) and Rating(0) are defined values, not "empty".
            _ => true,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
