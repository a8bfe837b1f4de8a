use std::collections::BTreeMap;

use crate::domain::{
    validate_responses, Clock, FieldId, FieldSpec, Layout, ResponseSet, ResponseValue,
    SignatureValue, SystemClock, Template, ValidationReport,
};

// ---------------------------------------------------------------------------
// FormRow — layout composition for a two-column rendering surface
// ---------------------------------------------------------------------------

/// One rendered row. A lone trailing half-width field keeps its empty
/// second cell (`Half(id, None)`) so the grid stays aligned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormRow {
    Full(FieldId),
    Half(FieldId, Option<FieldId>),
}

/// Walks fields in schema order: a full field takes its own row; a half
/// field pairs with the next entry iff that entry is also half. Pairing is
/// positional, so reordering fields changes the pairing.
pub fn layout_rows(fields: &[FieldSpec]) -> Vec<FormRow> {
    let mut rows = Vec::with_capacity(fields.len());
    let mut cursor = 0;
    while cursor < fields.len() {
        let field = &fields[cursor];
        match field.layout {
            Layout::Full => {
                rows.push(FormRow::Full(field.id.clone()));
                cursor += 1;
            }
            Layout::Half => {
                let partner = fields
                    .get(cursor + 1)
                    .filter(|next| next.layout == Layout::Half);
                match partner {
                    Some(next) => {
                        rows.push(FormRow::Half(field.id.clone(), Some(next.id.clone())));
                        cursor += 2;
                    }
                    None => {
                        rows.push(FormRow::Half(field.id.clone(), None));
                        cursor += 1;
                    }
                }
            }
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// FormSession — the UI-agnostic renderer contract
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("submission blocked: {} field(s) failed validation", .report.len())]
pub struct SubmitBlocked {
    pub report: ValidationReport,
}

/// In-memory accumulation of one referee's answers. No persistence, no
/// network: `submit` hands the response set back to the caller on success
/// and never resets its own state.
pub struct FormSession {
    template: Template,
    responses: ResponseSet,
    errors: BTreeMap<FieldId, String>,
    clock: Box<dyn Clock>,
}

impl FormSession {
    pub fn new(template: Template) -> Self {
        Self::with_clock(template, Box::new(SystemClock))
    }

    pub fn with_clock(template: Template, clock: Box<dyn Clock>) -> Self {
        Self {
            template,
            responses: ResponseSet::new(),
            errors: BTreeMap::new(),
            clock,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    pub fn response(&self, id: &FieldId) -> Option<&ResponseValue> {
        self.responses.get(id)
    }

    /// Errors recorded by the last failed submit, minus any cleared since.
    pub fn errors(&self) -> &BTreeMap<FieldId, String> {
        &self.errors
    }

    pub fn rows(&self) -> Vec<FormRow> {
        layout_rows(&self.template.fields)
    }

    /// Updates one field and clears its recorded error. Errors are not
    /// re-validated until the next submit attempt.
    pub fn set_response(&mut self, id: &FieldId, value: ResponseValue) {
        self.responses.insert(id.clone(), value);
        self.errors.remove(id);
    }

    pub fn clear_response(&mut self, id: &FieldId) {
        self.responses.remove(id);
        self.errors.remove(id);
    }

    /// Updates the typed-name part of a signature field.
    pub fn set_signature_name(&mut self, id: &FieldId, name: impl Into<String>) {
        let name = name.into();
        self.edit_signature(id, |sig| sig.typed_name = name);
    }

    /// Updates the drawn-ink part of a signature field. An empty data URL
    /// clears the ink.
    pub fn set_signature_ink(&mut self, id: &FieldId, data_url: impl Into<String>) {
        let data_url = data_url.into();
        self.edit_signature(id, |sig| {
            sig.signature_data_url = if data_url.is_empty() {
                None
            } else {
                Some(data_url)
            };
        });
    }

    fn edit_signature(&mut self, id: &FieldId, edit: impl FnOnce(&mut SignatureValue)) {
        let mut sig = match self.responses.remove(id) {
            Some(ResponseValue::Signature(sig)) => sig,
            // A non-signature value under this id is discarded wholesale.
            _ => SignatureValue::default(),
        };
        edit(&mut sig);
        // signed_at stamps once, at the first non-empty interaction, and
        // never moves on later keystrokes or strokes.
        if sig.signed_at.is_none() && sig.has_content() {
            sig.signed_at = Some(self.clock.now_utc());
        }
        self.responses.insert(id.clone(), ResponseValue::Signature(sig));
        self.errors.remove(id);
    }

    /// Runs the validator over the current responses. All-or-nothing: any
    /// failure records the full error map and nothing is handed out.
    pub fn submit(&mut self) -> Result<ResponseSet, SubmitBlocked> {
        let report = validate_responses(&self.template.fields, &self.responses);
        if report.is_valid() {
            self.errors.clear();
            Ok(self.responses.clone())
        } else {
            self.errors = report
                .iter()
                .map(|(id, msg)| (id.clone(), msg.to_owned()))
                .collect();
            Err(SubmitBlocked { report })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldSpec, FieldType};
    use chrono::{DateTime, Utc};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now_utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid RFC3339 timestamp")
            .with_timezone(&Utc)
    }

    fn make_template() -> Template {
        Template::new(
            "tpl-standard",
            "Standard reference",
            vec![
                FieldSpec::new("q1", FieldType::Rating, "Performance").required(),
                FieldSpec::new("sig", FieldType::Signature, "Sign here").required(),
            ],
        )
    }

    fn session_at(template: Template, when: &str) -> FormSession {
        FormSession::with_clock(template, Box::new(FixedClock(ts(when))))
    }

    #[test]
    fn test_layout_pairing() {
        let fields = vec![
            FieldSpec::new("a", FieldType::Text, "A"),
            FieldSpec::new("b", FieldType::Text, "B").half(),
            FieldSpec::new("c", FieldType::Text, "C").half(),
            FieldSpec::new("d", FieldType::Text, "D").half(),
        ];

        let rows = layout_rows(&fields);
        assert_eq!(
            rows,
            vec![
                FormRow::Full(FieldId::new("a")),
                FormRow::Half(FieldId::new("b"), Some(FieldId::new("c"))),
                FormRow::Half(FieldId::new("d"), None),
            ]
        );
    }

    #[test]
    fn test_half_does_not_pair_across_a_full_field() {
        let fields = vec![
            FieldSpec::new("a", FieldType::Text, "A").half(),
            FieldSpec::new("b", FieldType::Text, "B"),
            FieldSpec::new("c", FieldType::Text, "C").half(),
        ];

        let rows = layout_rows(&fields);
        assert_eq!(
            rows,
            vec![
                FormRow::Half(FieldId::new("a"), None),
                FormRow::Full(FieldId::new("b")),
                FormRow::Half(FieldId::new("c"), None),
            ]
        );
    }

    #[test]
    fn test_set_response_clears_only_that_error() {
        let mut session = session_at(make_template(), "2026-03-01T10:00:00Z");
        assert!(session.submit().is_err());
        assert_eq!(session.errors().len(), 2);

        session.set_response(&FieldId::new("q1"), ResponseValue::Rating(4));
        assert_eq!(session.errors().len(), 1);
        assert!(session.errors().contains_key(&FieldId::new("sig")));
    }

    #[test]
    fn test_clear_response_removes_value_and_error() {
        let mut session = session_at(make_template(), "2026-03-01T10:00:00Z");
        assert!(session.submit().is_err());

        session.clear_response(&FieldId::new("q1"));
        assert!(session.response(&FieldId::new("q1")).is_none());
        // The cleared field's error goes too; the other remains until the
        // next submit attempt.
        assert_eq!(session.errors().len(), 1);
    }

    #[test]
    fn test_submit_failure_performs_no_handoff() {
        let mut session = session_at(make_template(), "2026-03-01T10:00:00Z");
        session.set_response(&FieldId::new("q1"), ResponseValue::Rating(0));

        let err = session.submit().unwrap_err();
        // Rating 0 is defined: only the signature fails.
        assert_eq!(err.report.len(), 1);
        assert!(err.report.message(&FieldId::new("sig")).is_some());
        assert!(err.report.message(&FieldId::new("q1")).is_none());
    }

    #[test]
    fn test_successful_submit_keeps_state() {
        let mut session = session_at(make_template(), "2026-03-01T10:00:00Z");
        session.set_response(&FieldId::new("q1"), ResponseValue::Rating(3));
        session.set_signature_name(&FieldId::new("sig"), "Jane Doe");
        session.set_signature_ink(&FieldId::new("sig"), "data:image/png;base64,AAAA");

        let handed = session.submit().expect("valid submission");
        assert_eq!(handed.len(), 2);
        // Caller decides what happens next; the session keeps its responses.
        assert_eq!(session.responses().len(), 2);
        assert!(session.errors().is_empty());
    }

    #[test]
    fn test_signed_at_stamps_once() {
        let template = Template::new(
            "tpl",
            "t",
            vec![FieldSpec::new("sig", FieldType::Signature, "Sign").required()],
        );
        let sig_id = FieldId::new("sig");
        let mut session = session_at(template, "2026-03-01T10:00:00Z");

        session.set_signature_name(&sig_id, "J");
        let first = session
            .response(&sig_id)
            .and_then(ResponseValue::as_signature)
            .and_then(|s| s.signed_at)
            .expect("stamped at first interaction");
        assert_eq!(first, ts("2026-03-01T10:00:00Z"));

        // Later edits in the same session never move the stamp, even though
        // the clock is only consulted on the stamping edit.
        session.set_signature_name(&sig_id, "Jane Doe");
        session.set_signature_ink(&sig_id, "data:image/png;base64,AAAA");
        let after = session
            .response(&sig_id)
            .and_then(ResponseValue::as_signature)
            .and_then(|s| s.signed_at)
            .unwrap();
        assert_eq!(after, first);
    }

    #[test]
    fn test_empty_first_interaction_does_not_stamp() {
        let template = Template::new(
            "tpl",
            "t",
            vec![FieldSpec::new("sig", FieldType::Signature, "Sign")],
        );
        let sig_id = FieldId::new("sig");
        let mut session = session_at(template, "2026-03-01T10:00:00Z");

        session.set_signature_name(&sig_id, "");
        let sig = session
            .response(&sig_id)
            .and_then(ResponseValue::as_signature)
            .unwrap();
        assert!(sig.signed_at.is_none());

        session.set_signature_name(&sig_id, "Jane");
        let sig = session
            .response(&sig_id)
            .and_then(ResponseValue::as_signature)
            .unwrap();
        assert!(sig.signed_at.is_some());
    }

    #[test]
    fn test_empty_template_renders_nothing_and_submits() {
        let mut session = session_at(Template::new("tpl-empty", "Empty", vec![]), "2026-03-01T10:00:00Z");
        assert!(session.rows().is_empty());
        let handed = session.submit().expect("empty template is legal");
        assert!(handed.is_empty());
    }
}
