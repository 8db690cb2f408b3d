use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the store when a lead is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub u64);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed vocabulary exchanged as a string tag on the wire.
pub trait WireTag: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn tag(self) -> &'static str;

    /// Human-readable label shown next to the form control.
    fn label(self) -> &'static str;

    fn from_tag(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.tag() == raw)
    }

    fn expected_tags() -> String {
        Self::ALL
            .iter()
            .map(|value| value.tag())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! wire_tags {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $tag:literal, $label:literal;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl WireTag for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn tag(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.tag())
            }
        }
    };
}

wire_tags! {
    /// Who the lessons are for.
    RequesterRole {
        Student => "self", "Pour moi-même";
        Parent => "for-child", "Pour mon enfant";
    }
}

wire_tags! {
    /// Current school year or post-secondary programme of the learner.
    AcademicLevel {
        Sixieme => "6e", "6ème";
        Cinquieme => "5e", "5ème";
        Quatrieme => "4e", "4ème";
        Troisieme => "3e", "3ème";
        Seconde => "2nde", "2nde";
        Premiere => "1ere", "1ère";
        Terminale => "terminale", "Terminale";
        Licence => "licence", "Licence";
        Bts => "bts", "BTS";
        But => "but", "BUT";
    }
}

wire_tags! {
    NeedTag {
        Support => "support", "Soutien scolaire";
        Remediation => "remediation", "Remise à niveau";
        ExamPrep => "exam-prep", "Préparation aux examens";
        CompetitionPrep => "competition-prep", "Préparation aux concours";
    }
}

wire_tags! {
    /// Delivery mode of the lessons.
    Modality {
        Online => "online", "Distanciel (en ligne)";
        InPerson => "in-person", "Présentiel (en personne)";
        Either => "either", "Les deux (flexible)";
    }
}

wire_tags! {
    /// Requested volume of lessons per week.
    WeeklyHours {
        One => "1h", "1 heure";
        OneAndHalf => "1.5h", "1h30";
        Two => "2h", "2 heures";
        Three => "3h", "3 heures";
        MoreThanThree => "3h+", "Plus de 3 heures";
    }
}

wire_tags! {
    Goal {
        ShortTerm => "short-term", "Court terme (quelques mois)";
        LongTerm => "long-term", "Long terme (année scolaire complète)";
    }
}

/// Contact form payload exactly as posted by a visitor. Nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A lead that satisfied the intake schema and is waiting for the store to assign identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub requester_role: RequesterRole,
    pub level: AcademicLevel,
    pub needs: BTreeSet<NeedTag>,
    pub modality: Modality,
    pub weekly_hours: WeeklyHours,
    pub goal: Goal,
    pub availability: String,
    pub message: Option<String>,
}

/// A persisted lead. Identity and creation time are set once by the store and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    id: LeadId,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    lead: NewLead,
}

impl LeadRecord {
    pub(crate) fn new(id: LeadId, created_at: DateTime<Utc>, lead: NewLead) -> Self {
        Self {
            id,
            created_at,
            lead,
        }
    }

    pub fn id(&self) -> LeadId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lead(&self) -> &NewLead {
        &self.lead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn tags_parse_back_to_their_variant() {
        for level in AcademicLevel::ALL {
            assert_eq!(AcademicLevel::from_tag(level.tag()), Some(*level));
        }
        assert_eq!(WeeklyHours::from_tag("3h+"), Some(WeeklyHours::MoreThanThree));
        assert_eq!(Modality::from_tag("In-Person"), None);
    }

    #[test]
    fn expected_tags_lists_the_vocabulary_in_order() {
        assert_eq!(RequesterRole::expected_tags(), "self, for-child");
        assert_eq!(Goal::expected_tags(), "short-term, long-term");
    }

    #[test]
    fn record_serializes_flat_with_camel_case_keys() {
        let record = LeadRecord::new(
            LeadId(7),
            Utc.with_ymd_and_hms(2025, 9, 1, 18, 30, 0).unwrap(),
            NewLead {
                requester_role: RequesterRole::Parent,
                level: AcademicLevel::Troisieme,
                needs: BTreeSet::from([NeedTag::Support, NeedTag::ExamPrep]),
                modality: Modality::InPerson,
                weekly_hours: WeeklyHours::OneAndHalf,
                goal: Goal::LongTerm,
                availability: "Mercredi après-midi".to_string(),
                message: None,
            },
        );

        let value = serde_json::to_value(&record).expect("record serializes");
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["createdAt"], json!("2025-09-01T18:30:00Z"));
        assert_eq!(value["requesterRole"], json!("for-child"));
        assert_eq!(value["weeklyHours"], json!("1.5h"));
        assert_eq!(value["needs"], json!(["support", "exam-prep"]));
        assert_eq!(value["message"], serde_json::Value::Null);

        let decoded: LeadRecord = serde_json::from_value(value).expect("record decodes");
        assert_eq!(decoded, record);
    }

    #[test]
    fn submission_tolerates_missing_fields() {
        let submission: LeadSubmission =
            serde_json::from_value(json!({ "level": "terminale" })).expect("partial payload");
        assert_eq!(submission.level.as_deref(), Some("terminale"));
        assert!(submission.needs.is_none());
        assert!(submission.availability.is_none());
    }
}
