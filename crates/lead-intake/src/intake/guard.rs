use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{
    AcademicLevel, Goal, LeadSubmission, Modality, NeedTag, NewLead, RequesterRole, WeeklyHours,
    WireTag,
};

pub const REQUIRED_FIELD_MESSAGE: &str = "Ce champ est obligatoire";
pub const NEEDS_REQUIRED_MESSAGE: &str = "Veuillez sélectionner au moins un type de besoin";

const DEFAULT_MAX_AVAILABILITY_CHARS: usize = 500;
const DEFAULT_MAX_MESSAGE_CHARS: usize = 2000;

/// Machine-readable reason attached to a [`FieldIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidValue,
    TooSmall,
    TooLong,
    InvalidType,
    InvalidBody,
}

/// One violated constraint, addressed by the camelCase wire name of the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: IssueCode,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }

    fn required(field: &str) -> Self {
        Self::new(field, IssueCode::Required, REQUIRED_FIELD_MESSAGE)
    }
}

/// Every issue found in a submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("submission failed validation on {} field(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldIssue>);

impl ValidationErrors {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self(issues)
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    pub fn into_issues(self) -> Vec<FieldIssue> {
        self.0
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|issue| issue.field == field)
    }
}

/// Length limits for the free-text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePolicy {
    max_availability_chars: usize,
    max_message_chars: usize,
}

impl IntakePolicy {
    /// Zero limits fall back to the defaults.
    pub fn new(max_availability_chars: usize, max_message_chars: usize) -> Self {
        Self {
            max_availability_chars: if max_availability_chars == 0 {
                DEFAULT_MAX_AVAILABILITY_CHARS
            } else {
                max_availability_chars
            },
            max_message_chars: if max_message_chars == 0 {
                DEFAULT_MAX_MESSAGE_CHARS
            } else {
                max_message_chars
            },
        }
    }

    pub fn max_availability_chars(&self) -> usize {
        self.max_availability_chars
    }

    pub fn max_message_chars(&self) -> usize {
        self.max_message_chars
    }
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AVAILABILITY_CHARS, DEFAULT_MAX_MESSAGE_CHARS)
    }
}

/// Canonical intake schema. The server treats it as authoritative; the form runs the same
/// checks before sending anything.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    policy: IntakePolicy,
}

impl IntakeGuard {
    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Validate an untyped JSON body, reporting wrongly typed fields next to the schema issues.
    pub fn lead_from_json(&self, body: &Value) -> Result<NewLead, ValidationErrors> {
        let Some(fields) = body.as_object() else {
            return Err(ValidationErrors(vec![FieldIssue::new(
                "body",
                IssueCode::InvalidType,
                format!("Type attendu : objet, reçu : {}", json_kind(body)),
            )]));
        };

        let mut mistyped = Vec::new();
        let submission = LeadSubmission {
            requester_role: text_field(&mut mistyped, fields, "requesterRole"),
            level: text_field(&mut mistyped, fields, "level"),
            needs: list_field(&mut mistyped, fields, "needs"),
            modality: text_field(&mut mistyped, fields, "modality"),
            weekly_hours: text_field(&mut mistyped, fields, "weeklyHours"),
            goal: text_field(&mut mistyped, fields, "goal"),
            availability: text_field(&mut mistyped, fields, "availability"),
            message: text_field(&mut mistyped, fields, "message"),
        };

        match self.lead_from_submission(&submission) {
            Ok(lead) if mistyped.is_empty() => Ok(lead),
            Ok(_) => Err(ValidationErrors(mistyped)),
            Err(errors) => {
                let mut issues: Vec<FieldIssue> = errors
                    .into_issues()
                    .into_iter()
                    .filter(|issue| !mistyped.iter().any(|typed| typed.field == issue.field))
                    .collect();
                issues.append(&mut mistyped);
                issues.sort_by_key(|issue| field_rank(&issue.field));
                Err(ValidationErrors(issues))
            }
        }
    }

    /// Validate a raw submission and convert it into a typed lead.
    pub fn lead_from_submission(
        &self,
        submission: &LeadSubmission,
    ) -> Result<NewLead, ValidationErrors> {
        let mut issues = Vec::new();

        let requester_role = required_tag::<RequesterRole>(
            &mut issues,
            "requesterRole",
            submission.requester_role.as_deref(),
        );
        let level = required_tag::<AcademicLevel>(&mut issues, "level", submission.level.as_deref());
        let needs = needs_from(&mut issues, submission.needs.as_deref());
        let modality =
            required_tag::<Modality>(&mut issues, "modality", submission.modality.as_deref());
        let weekly_hours = required_tag::<WeeklyHours>(
            &mut issues,
            "weeklyHours",
            submission.weekly_hours.as_deref(),
        );
        let goal = required_tag::<Goal>(&mut issues, "goal", submission.goal.as_deref());

        let availability = match non_blank(submission.availability.as_deref()) {
            Some(text) => {
                check_length(
                    &mut issues,
                    "availability",
                    text,
                    self.policy.max_availability_chars,
                );
                Some(text.to_string())
            }
            None => {
                issues.push(FieldIssue::required("availability"));
                None
            }
        };

        let message = non_blank(submission.message.as_deref()).map(|text| {
            check_length(&mut issues, "message", text, self.policy.max_message_chars);
            text.to_string()
        });

        match (
            requester_role,
            level,
            needs,
            modality,
            weekly_hours,
            goal,
            availability,
        ) {
            (
                Some(requester_role),
                Some(level),
                Some(needs),
                Some(modality),
                Some(weekly_hours),
                Some(goal),
                Some(availability),
            ) if issues.is_empty() => Ok(NewLead {
                requester_role,
                level,
                needs,
                modality,
                weekly_hours,
                goal,
                availability,
                message,
            }),
            _ => Err(ValidationErrors(issues)),
        }
    }
}

const FIELD_ORDER: [&str; 8] = [
    "requesterRole",
    "level",
    "needs",
    "modality",
    "weeklyHours",
    "goal",
    "availability",
    "message",
];

fn field_rank(field: &str) -> usize {
    FIELD_ORDER
        .iter()
        .position(|known| *known == field)
        .unwrap_or(FIELD_ORDER.len())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "booléen",
        Value::Number(_) => "nombre",
        Value::String(_) => "texte",
        Value::Array(_) => "tableau",
        Value::Object(_) => "objet",
    }
}

fn type_issue(field: &str, expected: &str, value: &Value) -> FieldIssue {
    FieldIssue::new(
        field,
        IssueCode::InvalidType,
        format!("Type attendu : {expected}, reçu : {}", json_kind(value)),
    )
}

fn text_field(
    issues: &mut Vec<FieldIssue>,
    fields: &Map<String, Value>,
    field: &str,
) -> Option<String> {
    match fields.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            issues.push(type_issue(field, "texte", other));
            None
        }
    }
}

fn list_field(
    issues: &mut Vec<FieldIssue>,
    fields: &Map<String, Value>,
    field: &str,
) -> Option<Vec<String>> {
    match fields.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(text) => values.push(text.clone()),
                    other => {
                        issues.push(type_issue(field, "liste de textes", other));
                        return None;
                    }
                }
            }
            Some(values)
        }
        Some(other) => {
            issues.push(type_issue(field, "liste", other));
            None
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn required_tag<T: WireTag>(
    issues: &mut Vec<FieldIssue>,
    field: &str,
    raw: Option<&str>,
) -> Option<T> {
    let Some(value) = non_blank(raw) else {
        issues.push(FieldIssue::required(field));
        return None;
    };

    let parsed = T::from_tag(value);
    if parsed.is_none() {
        issues.push(FieldIssue::new(
            field,
            IssueCode::InvalidValue,
            format!(
                "Valeur « {value} » invalide (attendu : {})",
                T::expected_tags()
            ),
        ));
    }
    parsed
}

fn needs_from(issues: &mut Vec<FieldIssue>, raw: Option<&[String]>) -> Option<BTreeSet<NeedTag>> {
    let Some(raw) = raw else {
        issues.push(FieldIssue::new(
            "needs",
            IssueCode::Required,
            NEEDS_REQUIRED_MESSAGE,
        ));
        return None;
    };

    if raw.is_empty() {
        issues.push(FieldIssue::new(
            "needs",
            IssueCode::TooSmall,
            NEEDS_REQUIRED_MESSAGE,
        ));
        return None;
    }

    let mut needs = BTreeSet::new();
    let mut unknown = false;
    for value in raw {
        match NeedTag::from_tag(value.trim()) {
            Some(tag) => {
                needs.insert(tag);
            }
            None => {
                unknown = true;
                issues.push(FieldIssue::new(
                    "needs",
                    IssueCode::InvalidValue,
                    format!(
                        "Valeur « {} » invalide (attendu : {})",
                        value.trim(),
                        NeedTag::expected_tags()
                    ),
                ));
            }
        }
    }

    if unknown {
        None
    } else {
        Some(needs)
    }
}

fn check_length(issues: &mut Vec<FieldIssue>, field: &str, text: &str, max_chars: usize) {
    let length = text.chars().count();
    if length > max_chars {
        issues.push(FieldIssue::new(
            field,
            IssueCode::TooLong,
            format!("{max_chars} caractères maximum ({length} saisis)"),
        ));
    }
}
