//! Canonical student result record shared by the API and its clients.
//!
//! Earlier revisions of the record stored subjects in three shapes:
//!
//! 1. `{name, maxMarks, marksObtained, grade}`
//! 2. `{name, halfYearly: {obtained, total}, annualExam: {obtained, total}, grade}`
//! 3. `{name, annualExam: {obtained, total}, grade}`
//!
//! plus a generation where `annualExam` was a bare number out of 100.
//! [`SubjectInput`] accepts all of them and [`SubjectInput::migrate`] maps
//! them onto [`Subject`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grading::Aggregate;

/// Version stamped on records written in the canonical shape.
pub const SCHEMA_VERSION: i32 = 4;

/// Obtained/total marks for one exam period.
///
/// Either side may be absent; the grade calculator treats a missing obtained
/// mark as 0 and a missing total as 100.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MarkPair {
    #[schema(example = 78.0)]
    pub obtained: Option<f64>,
    #[schema(example = 100.0)]
    pub total: Option<f64>,
}

impl MarkPair {
    pub fn new(obtained: f64, total: f64) -> Self {
        Self {
            obtained: Some(obtained),
            total: Some(total),
        }
    }

    /// Parse marks from any of the shapes earlier clients sent: an object with
    /// `obtained`/`total`, a bare number, or a numeric string.
    pub fn from_loose(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                obtained: map.get("obtained").and_then(loose_number),
                total: map.get("total").and_then(loose_number),
            },
            other => Self {
                obtained: loose_number(other),
                total: None,
            },
        }
    }
}

/// One scholastic subject in canonical shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[schema(example = "Math")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_yearly: Option<MarkPair>,
    pub annual_exam: MarkPair,
    /// Letter grade. Stamped from the annual-exam percentage when not supplied.
    #[schema(example = "B")]
    pub grade: Option<String>,
}

/// A subject as submitted by any client generation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub half_yearly: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub annual_exam: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub max_marks: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub marks_obtained: Option<Value>,
    #[serde(default)]
    pub grade: Option<String>,
}

impl SubjectInput {
    pub fn migrate(self) -> Subject {
        let annual_exam = match &self.annual_exam {
            Some(value) if !value.is_null() => MarkPair::from_loose(value),
            _ => MarkPair {
                obtained: self.marks_obtained.as_ref().and_then(loose_number),
                total: self.max_marks.as_ref().and_then(loose_number),
            },
        };

        let half_yearly = self
            .half_yearly
            .as_ref()
            .filter(|v| !v.is_null())
            .map(MarkPair::from_loose);

        let grade = self
            .grade
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());

        Subject {
            name: self.name.trim().to_string(),
            half_yearly,
            annual_exam,
            grade,
        }
    }
}

impl From<Subject> for SubjectInput {
    fn from(subject: Subject) -> Self {
        let pair = |m: MarkPair| serde_json::json!({ "obtained": m.obtained, "total": m.total });
        Self {
            name: subject.name,
            half_yearly: subject.half_yearly.map(pair),
            annual_exam: Some(pair(subject.annual_exam)),
            max_marks: None,
            marks_obtained: None,
            grade: subject.grade,
        }
    }
}

/// Co-curricular area. Free-form, never graded by formula.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CoScholasticArea {
    #[serde(alias = "name", default)]
    #[schema(example = "Work Education")]
    pub area: String,
    #[serde(default)]
    #[schema(example = "A")]
    pub grade: String,
    #[serde(default)]
    pub remarks: String,
}

/// Reference to an externally hosted image. The record owns the reference,
/// not the bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    #[schema(example = "/media/student_photos/3f1c...e9.png")]
    pub url: String,
    #[schema(example = "student_photos/3f1c...e9.png")]
    pub public_id: String,
}

/// A student's result record as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    /// Internal id, used for update and delete.
    #[schema(example = 17)]
    pub id: i32,
    /// Public lookup key. Unique and immutable.
    #[schema(example = "8A028")]
    pub roll_no: String,
    pub name: String,
    #[schema(example = "8")]
    pub class_name: String,
    pub section: String,
    pub father_name: String,
    pub mother_name: String,
    pub dob: Option<NaiveDate>,
    pub admission_no: Option<String>,
    pub total_present_days: i32,
    pub total_school_days: Option<i32>,
    /// Always derived server-side from the two attendance fields.
    #[schema(example = 90)]
    pub attendance_percentage: i32,
    pub subjects: Vec<Subject>,
    pub co_scholastic_areas: Vec<CoScholasticArea>,
    pub aggregate: Option<Aggregate>,
    pub photo: Option<MediaRef>,
    pub fees_paid: bool,
    pub promoted_to_next_class: bool,
    pub result_declaration_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every input field of a result record.
///
/// Used as the create payload (sent as multipart text fields) and, with all
/// fields present, as the full-replace update body.
#[derive(Clone, Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub roll_no: String,
    pub name: String,
    pub class_name: String,
    pub section: String,
    pub father_name: String,
    pub mother_name: String,
    pub dob: Option<NaiveDate>,
    pub admission_no: Option<String>,
    pub total_present_days: i32,
    pub total_school_days: Option<i32>,
    pub subjects: Vec<SubjectInput>,
    pub co_scholastic_areas: Vec<CoScholasticArea>,
    pub fees_paid: bool,
    pub promoted_to_next_class: bool,
    pub result_declaration_date: Option<NaiveDate>,
}

impl ResultPayload {
    /// Text parts of the multipart create request, in field-name order.
    pub fn multipart_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("rollNo", self.roll_no.clone()),
            ("name", self.name.clone()),
            ("className", self.class_name.clone()),
            ("section", self.section.clone()),
            ("fatherName", self.father_name.clone()),
            ("motherName", self.mother_name.clone()),
            ("totalPresentDays", self.total_present_days.to_string()),
            ("feesPaid", self.fees_paid.to_string()),
            ("promotedToNextClass", self.promoted_to_next_class.to_string()),
            (
                "subjects",
                serde_json::to_string(&self.subjects).unwrap_or_else(|_| "[]".into()),
            ),
            (
                "coScholasticAreas",
                serde_json::to_string(&self.co_scholastic_areas).unwrap_or_else(|_| "[]".into()),
            ),
        ];
        if let Some(days) = self.total_school_days {
            fields.push(("totalSchoolDays", days.to_string()));
        }
        if let Some(dob) = self.dob {
            fields.push(("dob", dob.to_string()));
        }
        if let Some(ref admission_no) = self.admission_no {
            fields.push(("admissionNo", admission_no.clone()));
        }
        if let Some(date) = self.result_declaration_date {
            fields.push(("resultDeclarationDate", date.to_string()));
        }
        fields
    }
}

impl From<StudentResult> for ResultPayload {
    fn from(record: StudentResult) -> Self {
        Self {
            roll_no: record.roll_no,
            name: record.name,
            class_name: record.class_name,
            section: record.section,
            father_name: record.father_name,
            mother_name: record.mother_name,
            dob: record.dob,
            admission_no: record.admission_no,
            total_present_days: record.total_present_days,
            total_school_days: record.total_school_days,
            subjects: record.subjects.into_iter().map(SubjectInput::from).collect(),
            co_scholastic_areas: record.co_scholastic_areas,
            fees_paid: record.fees_paid,
            promoted_to_next_class: record.promoted_to_next_class,
            result_declaration_date: record.result_declaration_date,
        }
    }
}

/// Interpret a JSON value as a number if it plausibly is one.
///
/// Numbers pass through, numeric strings are parsed, everything else
/// (empty strings, "AB", null, objects) is `None`.
pub fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Parse a boolean the way HTML forms send it.
pub fn loose_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes")
}
