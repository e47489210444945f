//! Admin result entry form.
//!
//! Rows are addressed by position only; reordering while editing is not
//! supported. Required-field checks mirror the server's validation so obvious
//! mistakes are caught before a request is sent, but the server remains the
//! authority.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::grading;
use crate::student::{CoScholasticArea, ResultPayload, StudentResult, SubjectInput, loose_number};

/// Subjects a fresh form starts with.
pub const DEFAULT_SUBJECTS: &[&str] = &["English", "Hindi"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("At least one subject is required")]
    NoSubjects,
    #[error("Subject row {0} has no name")]
    UnnamedSubject(usize),
    #[error("Subject row {row}: {message}")]
    InvalidMarks { row: usize, message: String },
    #[error("Row {0} does not exist")]
    NoSuchRow(usize),
    #[error("Attendance: {0}")]
    InvalidAttendance(String),
}

/// One editable subject row. Marks stay as typed text until submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRowDraft {
    pub name: String,
    #[serde(default)]
    pub half_yearly_obtained: String,
    #[serde(default)]
    pub half_yearly_total: String,
    #[serde(default)]
    pub obtained: String,
    #[serde(default)]
    pub total: String,
    /// Leave empty to have the grade derived from the marks.
    #[serde(default)]
    pub grade: String,
}

impl SubjectRowDraft {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Grade preview shown next to the row while typing.
    pub fn preview_grade(&self) -> Option<String> {
        if !self.grade.trim().is_empty() {
            return Some(self.grade.trim().to_string());
        }
        let subject = self.to_input().migrate();
        subject.annual_exam.obtained?;
        Some(grading::subject_grade(&subject).to_string())
    }

    fn to_input(&self) -> SubjectInput {
        let half_yearly = (!self.half_yearly_obtained.trim().is_empty()
            || !self.half_yearly_total.trim().is_empty())
        .then(|| json!({"obtained": self.half_yearly_obtained.trim(), "total": self.half_yearly_total.trim()}));

        SubjectInput {
            name: self.name.trim().to_string(),
            half_yearly,
            annual_exam: Some(json!({"obtained": self.obtained.trim(), "total": self.total.trim()})),
            max_marks: None,
            marks_obtained: None,
            grade: Some(self.grade.trim().to_string()).filter(|g| !g.is_empty()),
        }
    }
}

/// Editable state of one result record, mirroring the record 1:1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultForm {
    pub roll_no: String,
    pub name: String,
    pub class_name: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub admission_no: String,
    #[serde(default)]
    pub total_present_days: String,
    #[serde(default)]
    pub total_school_days: String,
    #[serde(default)]
    pub subjects: Vec<SubjectRowDraft>,
    #[serde(default)]
    pub co_scholastic_areas: Vec<CoScholasticArea>,
    #[serde(default)]
    pub fees_paid: bool,
    #[serde(default)]
    pub promoted_to_next_class: bool,
    #[serde(default)]
    pub result_declaration_date: Option<NaiveDate>,
}

impl Default for ResultForm {
    fn default() -> Self {
        Self {
            roll_no: String::new(),
            name: String::new(),
            class_name: String::new(),
            section: String::new(),
            father_name: String::new(),
            mother_name: String::new(),
            dob: None,
            admission_no: String::new(),
            total_present_days: String::new(),
            total_school_days: String::new(),
            subjects: DEFAULT_SUBJECTS.iter().map(|n| SubjectRowDraft::named(n)).collect(),
            co_scholastic_areas: Vec::new(),
            fees_paid: false,
            promoted_to_next_class: false,
            result_declaration_date: None,
        }
    }
}

impl ResultForm {
    /// Pre-fill the form from a saved record for edit-in-place.
    pub fn from_record(record: &StudentResult) -> Self {
        let text = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
        Self {
            roll_no: record.roll_no.clone(),
            name: record.name.clone(),
            class_name: record.class_name.clone(),
            section: record.section.clone(),
            father_name: record.father_name.clone(),
            mother_name: record.mother_name.clone(),
            dob: record.dob,
            admission_no: record.admission_no.clone().unwrap_or_default(),
            total_present_days: record.total_present_days.to_string(),
            total_school_days: record
                .total_school_days
                .map(|d| d.to_string())
                .unwrap_or_default(),
            subjects: record
                .subjects
                .iter()
                .map(|s| SubjectRowDraft {
                    name: s.name.clone(),
                    half_yearly_obtained: text(s.half_yearly.as_ref().and_then(|h| h.obtained)),
                    half_yearly_total: text(s.half_yearly.as_ref().and_then(|h| h.total)),
                    obtained: text(s.annual_exam.obtained),
                    total: text(s.annual_exam.total),
                    // Only overrides are kept; derived grades are recomputed on save.
                    grade: s
                        .grade
                        .clone()
                        .filter(|g| g.as_str() != grading::subject_grade(s).as_str())
                        .unwrap_or_default(),
                })
                .collect(),
            co_scholastic_areas: record.co_scholastic_areas.clone(),
            fees_paid: record.fees_paid,
            promoted_to_next_class: record.promoted_to_next_class,
            result_declaration_date: record.result_declaration_date,
        }
    }

    pub fn add_subject(&mut self) -> usize {
        self.subjects.push(SubjectRowDraft::default());
        self.subjects.len() - 1
    }

    pub fn remove_subject(&mut self, index: usize) -> Result<SubjectRowDraft, FormError> {
        if index >= self.subjects.len() {
            return Err(FormError::NoSuchRow(index));
        }
        Ok(self.subjects.remove(index))
    }

    pub fn subject_mut(&mut self, index: usize) -> Result<&mut SubjectRowDraft, FormError> {
        self.subjects.get_mut(index).ok_or(FormError::NoSuchRow(index))
    }

    pub fn add_co_scholastic(&mut self) -> usize {
        self.co_scholastic_areas.push(CoScholasticArea::default());
        self.co_scholastic_areas.len() - 1
    }

    pub fn remove_co_scholastic(&mut self, index: usize) -> Result<CoScholasticArea, FormError> {
        if index >= self.co_scholastic_areas.len() {
            return Err(FormError::NoSuchRow(index));
        }
        Ok(self.co_scholastic_areas.remove(index))
    }

    /// Client-side checks run before any request is made.
    pub fn validate(&self) -> Result<(), FormError> {
        let missing: Vec<&'static str> = [
            ("rollNo", &self.roll_no),
            ("name", &self.name),
            ("className", &self.class_name),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        if self.subjects.is_empty() {
            return Err(FormError::NoSubjects);
        }

        for (index, row) in self.subjects.iter().enumerate() {
            if row.name.trim().is_empty() {
                return Err(FormError::UnnamedSubject(index));
            }
            let subject = row.to_input().migrate();
            if let (Some(obtained), Some(total)) = (subject.annual_exam.obtained, subject.annual_exam.total)
                && obtained > total
            {
                return Err(FormError::InvalidMarks {
                    row: index,
                    message: format!("obtained {obtained} exceeds total {total}"),
                });
            }
            if subject.annual_exam.obtained.is_some_and(|o| o < 0.0) {
                return Err(FormError::InvalidMarks {
                    row: index,
                    message: "marks cannot be negative".into(),
                });
            }
        }

        let present = parse_days(&self.total_present_days)?;
        let school = parse_days(&self.total_school_days)?;
        if let (Some(p), Some(s)) = (present, school)
            && p > s
        {
            return Err(FormError::InvalidAttendance(
                "present days exceed school days".into(),
            ));
        }

        Ok(())
    }

    /// Validate and convert to the payload sent to the API.
    pub fn to_payload(&self) -> Result<ResultPayload, FormError> {
        self.validate()?;

        let admission_no = self.admission_no.trim();
        Ok(ResultPayload {
            roll_no: self.roll_no.trim().to_string(),
            name: self.name.trim().to_string(),
            class_name: self.class_name.trim().to_string(),
            section: self.section.trim().to_string(),
            father_name: self.father_name.trim().to_string(),
            mother_name: self.mother_name.trim().to_string(),
            dob: self.dob,
            admission_no: (!admission_no.is_empty()).then(|| admission_no.to_string()),
            total_present_days: parse_days(&self.total_present_days)?.unwrap_or(0),
            total_school_days: parse_days(&self.total_school_days)?,
            subjects: self.subjects.iter().map(SubjectRowDraft::to_input).collect(),
            co_scholastic_areas: self
                .co_scholastic_areas
                .iter()
                .filter(|a| !a.area.trim().is_empty())
                .cloned()
                .collect(),
            fees_paid: self.fees_paid,
            promoted_to_next_class: self.promoted_to_next_class,
            result_declaration_date: self.result_declaration_date,
        })
    }
}

fn parse_days(raw: &str) -> Result<Option<i32>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value = loose_number(&serde_json::Value::String(raw.to_string()))
        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(i32::MAX))
        .ok_or_else(|| FormError::InvalidAttendance(format!("'{raw}' is not a whole number of days")))?;
    Ok(Some(value as i32))
}

/// Edit-in-place session over a saved record.
///
/// `save` hands back the payload for the update call; `cancel` throws the
/// local edits away and makes no request.
#[derive(Debug)]
pub struct EditSession {
    id: i32,
    original: ResultForm,
    pub draft: ResultForm,
}

impl EditSession {
    pub fn begin(record: &StudentResult) -> Self {
        let form = ResultForm::from_record(record);
        Self {
            id: record.id,
            original: form.clone(),
            draft: form,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    /// Id and payload for the update request.
    pub fn save(&self) -> Result<(i32, ResultPayload), FormError> {
        Ok((self.id, self.draft.to_payload()?))
    }

    pub fn cancel(self) -> ResultForm {
        self.original
    }
}
