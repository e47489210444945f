use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use common::grading::{self, Aggregate};
use common::student::{
    CoScholasticArea, MediaRef, ResultPayload, SCHEMA_VERSION, StudentResult, Subject,
    SubjectInput, loose_bool,
};
use sea_orm::Set;
use serde::Deserialize;

use crate::entity::student_result;
use crate::error::AppError;
use crate::models::shared::{double_option, max_chars, required};

/// Sort keys accepted by the result listing, mapped to their columns.
pub const SORT_KEYS: &[&str] = &["name", "rollNo", "className", "createdAt", "updatedAt"];

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ResultListQuery {
    /// Page number, 1-based. Default 1.
    pub page: Option<u64>,
    /// Page size, 1-100. Default 10.
    pub limit: Option<u64>,
    /// Exact class-name filter.
    pub class_name: Option<String>,
    /// Case-insensitive substring of name or roll number.
    pub search: Option<String>,
    /// One of `name` (default), `rollNo`, `className`, `createdAt`, `updatedAt`.
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    pub sort_order: Option<String>,
}

/// Partial update. Absent fields are left unchanged; nullable fields may be
/// cleared with an explicit `null`.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateResultRequest {
    /// Accepted only when equal to the stored roll number.
    pub roll_no: Option<String>,
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub section: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub dob: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub admission_no: Option<Option<String>>,
    pub total_present_days: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub total_school_days: Option<Option<i32>>,
    pub subjects: Option<Vec<SubjectInput>>,
    pub co_scholastic_areas: Option<Vec<CoScholasticArea>>,
    pub fees_paid: Option<bool>,
    pub promoted_to_next_class: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub result_declaration_date: Option<Option<NaiveDate>>,
}

/// Every input field of a result, after migration and validation.
///
/// Derived values (attendance, grades, aggregate) are computed from this
/// when it is written, never taken from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDocument {
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
    pub subjects: Vec<Subject>,
    pub co_scholastic_areas: Vec<CoScholasticArea>,
    pub fees_paid: bool,
    pub promoted_to_next_class: bool,
    pub result_declaration_date: Option<NaiveDate>,
}

impl ResultDocument {
    pub fn from_payload(payload: ResultPayload) -> Result<Self, AppError> {
        let mut doc = Self {
            roll_no: required("rollNo", &payload.roll_no)?,
            name: required("name", &payload.name)?,
            class_name: required("className", &payload.class_name)?,
            section: payload.section.trim().to_string(),
            father_name: payload.father_name.trim().to_string(),
            mother_name: payload.mother_name.trim().to_string(),
            dob: payload.dob,
            admission_no: non_blank(payload.admission_no),
            total_present_days: payload.total_present_days,
            total_school_days: payload.total_school_days,
            subjects: payload
                .subjects
                .into_iter()
                .map(SubjectInput::migrate)
                .collect(),
            co_scholastic_areas: clean_areas(payload.co_scholastic_areas),
            fees_paid: payload.fees_paid,
            promoted_to_next_class: payload.promoted_to_next_class,
            result_declaration_date: payload.result_declaration_date,
        };
        doc.validate()?;
        grading::stamp_grades(&mut doc.subjects);
        Ok(doc)
    }

    /// Rebuild the document from a stored row. Rows written in older subject
    /// shapes are migrated on the way out.
    pub fn from_model(model: &student_result::Model) -> Result<Self, AppError> {
        Ok(Self {
            roll_no: model.roll_no.clone(),
            name: model.name.clone(),
            class_name: model.class_name.clone(),
            section: model.section.clone(),
            father_name: model.father_name.clone(),
            mother_name: model.mother_name.clone(),
            dob: model.dob,
            admission_no: model.admission_no.clone(),
            total_present_days: model.total_present_days,
            total_school_days: model.total_school_days,
            subjects: stored_subjects(&model.subjects)?,
            co_scholastic_areas: serde_json::from_value(model.co_scholastic_areas.clone())
                .map_err(|e| AppError::Internal(format!("Corrupt co-scholastic areas: {e}")))?,
            fees_paid: model.fees_paid,
            promoted_to_next_class: model.promoted_to_next_class,
            result_declaration_date: model.result_declaration_date,
        })
    }

    /// Merge a partial update. The roll number cannot change.
    pub fn apply(&mut self, update: UpdateResultRequest) -> Result<(), AppError> {
        if let Some(roll_no) = update.roll_no
            && roll_no.trim() != self.roll_no
        {
            return Err(AppError::Validation("rollNo cannot be changed".into()));
        }

        if let Some(name) = update.name {
            self.name = required("name", &name)?;
        }
        if let Some(class_name) = update.class_name {
            self.class_name = required("className", &class_name)?;
        }
        if let Some(section) = update.section {
            self.section = section.trim().to_string();
        }
        if let Some(father_name) = update.father_name {
            self.father_name = father_name.trim().to_string();
        }
        if let Some(mother_name) = update.mother_name {
            self.mother_name = mother_name.trim().to_string();
        }
        if let Some(dob) = update.dob {
            self.dob = dob;
        }
        if let Some(admission_no) = update.admission_no {
            self.admission_no = non_blank(admission_no);
        }
        if let Some(days) = update.total_present_days {
            self.total_present_days = days;
        }
        if let Some(days) = update.total_school_days {
            self.total_school_days = days;
        }
        if let Some(subjects) = update.subjects {
            self.subjects = subjects.into_iter().map(SubjectInput::migrate).collect();
        }
        if let Some(areas) = update.co_scholastic_areas {
            self.co_scholastic_areas = clean_areas(areas);
        }
        if let Some(fees_paid) = update.fees_paid {
            self.fees_paid = fees_paid;
        }
        if let Some(promoted) = update.promoted_to_next_class {
            self.promoted_to_next_class = promoted;
        }
        if let Some(date) = update.result_declaration_date {
            self.result_declaration_date = date;
        }

        self.validate()?;
        grading::stamp_grades(&mut self.subjects);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        max_chars("rollNo", &self.roll_no, 32)?;
        max_chars("name", &self.name, 128)?;
        max_chars("className", &self.class_name, 32)?;

        if self.total_present_days < 0 {
            return Err(AppError::Validation(
                "totalPresentDays must be >= 0".into(),
            ));
        }
        if self.total_school_days.is_some_and(|d| d < 0) {
            return Err(AppError::Validation("totalSchoolDays must be >= 0".into()));
        }

        for (index, subject) in self.subjects.iter().enumerate() {
            if subject.name.is_empty() {
                return Err(AppError::Validation(format!(
                    "Subject {} has no name",
                    index + 1
                )));
            }
            let negative = [subject.half_yearly.as_ref(), Some(&subject.annual_exam)]
                .into_iter()
                .flatten()
                .any(|m| m.obtained.is_some_and(|v| v < 0.0) || m.total.is_some_and(|v| v < 0.0));
            if negative {
                return Err(AppError::Validation(format!(
                    "Marks for {} cannot be negative",
                    subject.name
                )));
            }
        }
        Ok(())
    }

    pub fn attendance_percentage(&self) -> i32 {
        grading::attendance_percentage(self.total_present_days, self.total_school_days)
    }

    pub fn aggregate(&self) -> Option<Aggregate> {
        grading::aggregate(&self.subjects)
    }

    /// Write every stored column, including derived values, into `active`.
    pub fn write_to(
        self,
        active: &mut student_result::ActiveModel,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let attendance = self.attendance_percentage();
        let aggregate = self
            .aggregate()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to encode aggregate: {e}")))?;
        let subjects = serde_json::to_value(&self.subjects)
            .map_err(|e| AppError::Internal(format!("Failed to encode subjects: {e}")))?;
        let areas = serde_json::to_value(&self.co_scholastic_areas)
            .map_err(|e| AppError::Internal(format!("Failed to encode co-scholastic areas: {e}")))?;

        active.roll_no = Set(self.roll_no);
        active.name = Set(self.name);
        active.class_name = Set(self.class_name);
        active.section = Set(self.section);
        active.father_name = Set(self.father_name);
        active.mother_name = Set(self.mother_name);
        active.dob = Set(self.dob);
        active.admission_no = Set(self.admission_no);
        active.total_present_days = Set(self.total_present_days);
        active.total_school_days = Set(self.total_school_days);
        active.attendance_percentage = Set(attendance);
        active.subjects = Set(subjects);
        active.co_scholastic_areas = Set(areas);
        active.aggregate = Set(aggregate);
        active.fees_paid = Set(self.fees_paid);
        active.promoted_to_next_class = Set(self.promoted_to_next_class);
        active.result_declaration_date = Set(self.result_declaration_date);
        active.schema_version = Set(SCHEMA_VERSION);
        active.updated_at = Set(now);
        Ok(())
    }
}

/// Build the create payload from multipart text fields.
///
/// Lists arrive JSON-encoded; numbers and booleans arrive as form text.
pub fn payload_from_fields(fields: &HashMap<String, String>) -> Result<ResultPayload, AppError> {
    let text = |key: &str| field(fields, key);

    let subjects = match text("subjects") {
        "" => Vec::new(),
        raw => serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("subjects must be a JSON list: {e}")))?,
    };
    let co_scholastic_areas = match text("coScholasticAreas") {
        "" => Vec::new(),
        raw => serde_json::from_str(raw).map_err(|e| {
            AppError::Validation(format!("coScholasticAreas must be a JSON list: {e}"))
        })?,
    };

    Ok(ResultPayload {
        roll_no: text("rollNo").to_string(),
        name: text("name").to_string(),
        class_name: text("className").to_string(),
        section: text("section").to_string(),
        father_name: text("fatherName").to_string(),
        mother_name: text("motherName").to_string(),
        dob: parse_date("dob", text("dob"))?,
        admission_no: Some(text("admissionNo").to_string()),
        total_present_days: parse_days("totalPresentDays", text("totalPresentDays"))?
            .unwrap_or(0),
        total_school_days: parse_days("totalSchoolDays", text("totalSchoolDays"))?,
        subjects,
        co_scholastic_areas,
        fees_paid: loose_bool(text("feesPaid")),
        promoted_to_next_class: loose_bool(text("promotedToNextClass")),
        result_declaration_date: parse_date(
            "resultDeclarationDate",
            text("resultDeclarationDate"),
        )?,
    })
}

/// API view of a stored row.
pub fn to_student(model: student_result::Model) -> Result<StudentResult, AppError> {
    let subjects = stored_subjects(&model.subjects)?;
    let aggregate = model
        .aggregate
        .and_then(|value| serde_json::from_value::<Aggregate>(value).ok())
        .or_else(|| grading::aggregate(&subjects));
    let co_scholastic_areas = serde_json::from_value(model.co_scholastic_areas)
        .map_err(|e| AppError::Internal(format!("Corrupt co-scholastic areas: {e}")))?;
    let photo = match (model.photo_url, model.photo_public_id) {
        (Some(url), Some(public_id)) => Some(MediaRef { url, public_id }),
        _ => None,
    };

    Ok(StudentResult {
        id: model.id,
        roll_no: model.roll_no,
        name: model.name,
        class_name: model.class_name,
        section: model.section,
        father_name: model.father_name,
        mother_name: model.mother_name,
        dob: model.dob,
        admission_no: model.admission_no,
        total_present_days: model.total_present_days,
        total_school_days: model.total_school_days,
        attendance_percentage: model.attendance_percentage,
        subjects,
        co_scholastic_areas,
        aggregate,
        photo,
        fees_paid: model.fees_paid,
        promoted_to_next_class: model.promoted_to_next_class,
        result_declaration_date: model.result_declaration_date,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn field<'a>(fields: &'a HashMap<String, String>, key: &str) -> &'a str {
    fields.get(key).map(|v| v.trim()).unwrap_or_default()
}

fn stored_subjects(value: &serde_json::Value) -> Result<Vec<Subject>, AppError> {
    let inputs: Vec<SubjectInput> = serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(format!("Corrupt subjects: {e}")))?;
    Ok(inputs.into_iter().map(SubjectInput::migrate).collect())
}

fn clean_areas(areas: Vec<CoScholasticArea>) -> Vec<CoScholasticArea> {
    areas
        .into_iter()
        .map(|a| CoScholasticArea {
            area: a.area.trim().to_string(),
            grade: a.grade.trim().to_string(),
            remarks: a.remarks.trim().to_string(),
        })
        .filter(|a| !a.area.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(field: &str, raw: &str) -> Result<Option<NaiveDate>, AppError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| AppError::Validation(format!("{field} must be a date (YYYY-MM-DD)")))
}

fn parse_days(field: &str, raw: &str) -> Result<Option<i32>, AppError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i32>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("{field} must be a whole number")))
}
