use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{FieldId, TemplateError, TemplateId};

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Rating,
    Boolean,
    Date,
    Signature,
    Email,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Full,
    Half,
}

// ---------------------------------------------------------------------------
// Conditional — dependency on another field's response
// ---------------------------------------------------------------------------

/// Makes a field active only when another field's response equals `equals`.
/// An inactive field is skipped entirely by validation; an active one takes
/// its required flag from here instead of `FieldSpec::required`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub field: FieldId,
    pub equals: serde_json::Value,
    pub required: bool,
}

// ---------------------------------------------------------------------------
// FieldSpec — one question of a reference form
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: FieldId::new(id),
            field_type,
            label: label.into(),
            required: false,
            layout: Layout::Full,
            conditional: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn half(mut self) -> Self {
        self.layout = Layout::Half;
        self
    }

    pub fn when(mut self, field: impl Into<String>, equals: serde_json::Value, required: bool) -> Self {
        self.conditional = Some(Conditional {
            field: FieldId::new(field),
            equals,
            required,
        });
        self
    }
}

// ---------------------------------------------------------------------------
// Template — an ordered form definition owned by the backend
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub template_id: TemplateId,
    pub name: String,
    pub active: bool,
    /// The wire's `structureJSON`: field order defines form and preview order.
    #[serde(rename = "structureJSON")]
    pub fields: Vec<FieldSpec>,
}

impl Template {
    pub fn new(template_id: impl Into<String>, name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            template_id: TemplateId::new(template_id),
            name: name.into(),
            active: true,
            fields,
        }
    }

    /// An empty template is legal: it renders nothing. Callers that want to
    /// surface the "template is fine but has no fields" state check this.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Structural validation: unique field ids, non-empty labels, and
    /// conditionals that point at another field that actually exists.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut seen: HashSet<&FieldId> = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(&field.id) {
                return Err(TemplateError::DuplicateFieldId {
                    id: field.id.clone(),
                });
            }
            if field.label.trim().is_empty() {
                return Err(TemplateError::EmptyLabel {
                    id: field.id.clone(),
                });
            }
        }
        for field in &self.fields {
            if let Some(cond) = &field.conditional {
                if cond.field == field.id {
                    return Err(TemplateError::SelfConditional {
                        id: field.id.clone(),
                    });
                }
                if !self.fields.iter().any(|f| f.id == cond.field) {
                    return Err(TemplateError::UnknownConditionalTarget {
                        id: field.id.clone(),
                        target: cond.field.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
