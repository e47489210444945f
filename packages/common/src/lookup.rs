//! Public result lookup: the fees gate and the rendered report card.
//!
//! The API returns the full record whatever its payment status, so the gate
//! lives here. [`LookupState::FeesPending`] deliberately keeps only the roll
//! number and the student's name; nothing scholastic survives the transition.

use std::fmt::Write as _;

use thiserror::Error;

use crate::grading::{self, Aggregate, Grade};
use crate::student::{CoScholasticArea, MarkPair, StudentResult};

pub const FEES_PENDING_MESSAGE: &str = "Fees not paid. Please submit your fees to view the result.";
pub const NOT_FOUND_MESSAGE: &str = "No result found for this roll number";

/// Styling class of a user-visible notice.
///
/// Fees-pending is a warning (amber), never an error (red).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// What came back for one search.
#[derive(Debug)]
pub enum LookupOutcome {
    Found(StudentResult),
    Missing,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LookupState {
    /// Awaiting input. Carries the error from a failed search, if any.
    Idle { error: Option<Notice> },
    Searching { roll_no: String },
    FeesPending { roll_no: String, name: String },
    Visible(Box<ReportCard>),
    NotFound { roll_no: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Please enter a roll number")]
    EmptyRollNo,
    #[error("A search is already in progress")]
    AlreadySearching,
    #[error("No search is in progress")]
    NotSearching,
}

/// One lookup session. Each submission is one-shot; there is no retry.
#[derive(Debug)]
pub struct ResultLookup {
    state: LookupState,
}

impl Default for ResultLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultLookup {
    pub fn new() -> Self {
        Self {
            state: LookupState::Idle { error: None },
        }
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    /// Start a search. Allowed from any state except `Searching`.
    ///
    /// Returns the trimmed roll number to query.
    pub fn submit(&mut self, roll_no: &str) -> Result<String, LookupError> {
        if matches!(self.state, LookupState::Searching { .. }) {
            return Err(LookupError::AlreadySearching);
        }
        let roll_no = roll_no.trim();
        if roll_no.is_empty() {
            return Err(LookupError::EmptyRollNo);
        }
        self.state = LookupState::Searching {
            roll_no: roll_no.to_string(),
        };
        Ok(roll_no.to_string())
    }

    /// Apply the response of the in-flight search.
    pub fn resolve(&mut self, outcome: LookupOutcome) -> Result<&LookupState, LookupError> {
        let LookupState::Searching { roll_no } = &self.state else {
            return Err(LookupError::NotSearching);
        };
        let roll_no = roll_no.clone();

        self.state = match outcome {
            LookupOutcome::Found(record) if !record.fees_paid => LookupState::FeesPending {
                roll_no,
                name: record.name,
            },
            LookupOutcome::Found(record) => LookupState::Visible(Box::new(ReportCard::from_record(&record))),
            LookupOutcome::Missing => LookupState::NotFound { roll_no },
            LookupOutcome::Failed(message) => LookupState::Idle {
                error: Some(Notice::error(message)),
            },
        };
        Ok(&self.state)
    }

    /// Notice to show for the current state, if any.
    pub fn notice(&self) -> Option<Notice> {
        match &self.state {
            LookupState::Idle { error } => error.clone(),
            LookupState::FeesPending { .. } => Some(Notice {
                severity: Severity::Warning,
                message: FEES_PENDING_MESSAGE.into(),
            }),
            LookupState::NotFound { .. } => Some(Notice::error(NOT_FOUND_MESSAGE)),
            LookupState::Searching { .. } | LookupState::Visible(_) => None,
        }
    }

    pub fn report_card(&self) -> Option<&ReportCard> {
        match &self.state {
            LookupState::Visible(card) => Some(card),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubjectRow {
    pub name: String,
    pub half_yearly: Option<MarkPair>,
    pub annual_exam: MarkPair,
    pub grade: String,
}

/// Everything printed on a report card, derived once from the record.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportCard {
    pub roll_no: String,
    pub name: String,
    pub class_name: String,
    pub section: String,
    pub father_name: String,
    pub mother_name: String,
    pub admission_no: Option<String>,
    pub dob: Option<String>,
    pub photo_url: Option<String>,
    pub total_present_days: i32,
    pub total_school_days: Option<i32>,
    pub attendance_percentage: i32,
    pub subjects: Vec<SubjectRow>,
    pub aggregate: Option<Aggregate>,
    pub co_scholastic: Vec<CoScholasticArea>,
    /// "Same Class" when not promoted.
    pub promoted_to: String,
    pub declared_on: Option<String>,
}

impl ReportCard {
    /// Build the card. Stored grades are shown as-is; only a subject with no
    /// stored grade falls back to the shared calculator.
    pub fn from_record(record: &StudentResult) -> Self {
        let subjects = record
            .subjects
            .iter()
            .map(|s| SubjectRow {
                name: s.name.clone(),
                half_yearly: s.half_yearly.clone(),
                annual_exam: s.annual_exam.clone(),
                grade: s
                    .grade
                    .clone()
                    .filter(|g| !g.trim().is_empty())
                    .unwrap_or_else(|| grading::subject_grade(s).to_string()),
            })
            .collect();

        let aggregate = record
            .aggregate
            .clone()
            .or_else(|| grading::aggregate(&record.subjects));

        Self {
            roll_no: record.roll_no.clone(),
            name: record.name.clone(),
            class_name: record.class_name.clone(),
            section: record.section.clone(),
            father_name: record.father_name.clone(),
            mother_name: record.mother_name.clone(),
            admission_no: record.admission_no.clone(),
            dob: record.dob.map(|d| d.format("%d-%m-%Y").to_string()),
            photo_url: record.photo.as_ref().map(|p| p.url.clone()),
            total_present_days: record.total_present_days,
            total_school_days: record.total_school_days,
            attendance_percentage: record.attendance_percentage,
            subjects,
            aggregate,
            co_scholastic: record.co_scholastic_areas.clone(),
            promoted_to: grading::promotion_label(&record.class_name, record.promoted_to_next_class)
                .unwrap_or_else(|| "Same Class".to_string()),
            declared_on: record
                .result_declaration_date
                .map(|d| d.format("%d-%m-%Y").to_string()),
        }
    }

    /// Suggested download name, e.g. `Asha_8_result.txt`.
    pub fn export_file_name(&self) -> String {
        let clean = |s: &str| {
            s.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect::<String>()
        };
        format!("{}_{}_result.txt", clean(&self.name), clean(&self.class_name))
    }

    /// Plain-text rendering used by terminal output and file export.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = "-".repeat(64);

        let _ = writeln!(out, "ANNUAL REPORT CARD: CLASS {}", self.class_name);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Student's Name : {:<24} Roll No.      : {}", self.name, self.roll_no);
        let _ = writeln!(
            out,
            "Mother's Name  : {:<24} Admission No. : {}",
            self.mother_name,
            self.admission_no.as_deref().unwrap_or("-")
        );
        let _ = writeln!(
            out,
            "Father's Name  : {:<24} Date of Birth : {}",
            self.father_name,
            self.dob.as_deref().unwrap_or("-")
        );
        let section = if self.section.is_empty() {
            String::new()
        } else {
            format!(" ({})", self.section)
        };
        let _ = writeln!(out, "Class          : {}{}", self.class_name, section);
        let _ = writeln!(out, "{rule}");

        let school_days = self
            .total_school_days
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "ATTENDANCE: {} / {} days ({}%)",
            self.total_present_days, school_days, self.attendance_percentage
        );
        let _ = writeln!(out, "{rule}");

        let _ = writeln!(out, "SCHOLASTIC AREAS");
        let _ = writeln!(out, "{:<20} {:>12} {:>12} {:>6}", "Subject", "Half Yearly", "Annual", "Grade");
        for row in &self.subjects {
            let _ = writeln!(
                out,
                "{:<20} {:>12} {:>12} {:>6}",
                row.name,
                row.half_yearly.as_ref().map(format_marks).unwrap_or_else(|| "-".into()),
                format_marks(&row.annual_exam),
                row.grade
            );
        }
        match &self.aggregate {
            Some(agg) => {
                let _ = writeln!(
                    out,
                    "Aggregate: {}/{} = {:.2}%   Grade: {}",
                    agg.obtained, agg.total, agg.percentage, agg.grade
                );
            }
            None => {
                let _ = writeln!(out, "Aggregate: N/A");
            }
        }
        let _ = writeln!(out, "{rule}");

        if !self.co_scholastic.is_empty() {
            let _ = writeln!(out, "CO-SCHOLASTIC AREAS");
            for area in &self.co_scholastic {
                let remarks = if area.remarks.is_empty() { "-" } else { &area.remarks };
                let _ = writeln!(out, "{:<28} {:>4}   Remarks: {}", area.area, area.grade, remarks);
            }
            let _ = writeln!(out, "{rule}");
        }

        let _ = writeln!(out, "PROMOTED TO: {}", self.promoted_to);
        if let Some(ref date) = self.declared_on {
            let _ = writeln!(out, "Result declared on: {date}");
        }
        let _ = writeln!(out, "{rule}");

        let legend = Grade::ALL
            .iter()
            .map(|g| format!("{} {}", g.band(), g))
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(out, "GRADING: {legend}");
        out
    }
}

fn format_marks(marks: &MarkPair) -> String {
    let (obtained, total) = grading::effective_marks(marks);
    match marks.obtained {
        Some(_) => format!("{obtained}/{total}"),
        None => format!("-/{total}"),
    }
}
