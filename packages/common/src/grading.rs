use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::student::{MarkPair, Subject};

/// Total assumed for a subject whose declared total is missing or not positive.
pub const DEFAULT_SUBJECT_TOTAL: f64 = 100.0;

/// Letter grade from the five-band table.
///
/// | Percentage | Grade |
/// |---|---|
/// | >= 86 | A |
/// | 71-85 | B |
/// | 51-70 | C |
/// | 31-50 | D |
/// | 0-30  | E |
///
/// Fractional percentages fall into the lower band until they reach the next
/// band's lower bound, so 85.5 is a B and 30.9 is an E.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 86.0 {
            Self::A
        } else if percentage >= 71.0 {
            Self::B
        } else if percentage >= 51.0 {
            Self::C
        } else if percentage >= 31.0 {
            Self::D
        } else {
            Self::E
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Band bounds for the grading legend printed on report cards.
    pub fn band(&self) -> &'static str {
        match self {
            Self::A => "86-100",
            Self::B => "71-85",
            Self::C => "51-70",
            Self::D => "31-50",
            Self::E => "0-30",
        }
    }

    pub const ALL: [Grade; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            other => Err(format!("Unknown grade: {other}")),
        }
    }
}

/// Summary across all of a student's subjects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Aggregate {
    /// Sum of obtained marks.
    #[schema(example = 412.0)]
    pub obtained: f64,
    /// Sum of subject totals.
    #[schema(example = 500.0)]
    pub total: f64,
    /// `obtained * 100 / total`, rounded to two decimals.
    #[schema(example = 82.4)]
    pub percentage: f64,
    pub grade: Grade,
}

/// Effective (obtained, total) for a mark pair.
///
/// A missing obtained mark counts as 0; a missing or non-positive total counts
/// as [`DEFAULT_SUBJECT_TOTAL`].
pub fn effective_marks(marks: &MarkPair) -> (f64, f64) {
    let obtained = marks.obtained.filter(|v| v.is_finite()).unwrap_or(0.0);
    let total = marks
        .total
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(DEFAULT_SUBJECT_TOTAL);
    (obtained, total)
}

pub fn percentage(obtained: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    obtained * 100.0 / total
}

/// Grade of one subject, from its own annual-exam marks only.
pub fn subject_grade(subject: &Subject) -> Grade {
    let (obtained, total) = effective_marks(&subject.annual_exam);
    Grade::from_percentage(percentage(obtained, total))
}

/// Sum-of-obtained over sum-of-total across all subjects.
///
/// Returns `None` when there are no subjects. A subject with missing marks
/// stays in the denominator.
pub fn aggregate(subjects: &[Subject]) -> Option<Aggregate> {
    if subjects.is_empty() {
        return None;
    }

    let (obtained, total) = subjects
        .iter()
        .map(|s| effective_marks(&s.annual_exam))
        .fold((0.0, 0.0), |(o, t), (so, st)| (o + so, t + st));

    let raw = percentage(obtained, total);
    Some(Aggregate {
        obtained,
        total,
        percentage: round2(raw),
        grade: Grade::from_percentage(raw),
    })
}

/// Fill in every subject grade that was not explicitly supplied.
pub fn stamp_grades(subjects: &mut [Subject]) {
    for subject in subjects.iter_mut() {
        let supplied = subject
            .grade
            .as_deref()
            .map(str::trim)
            .is_some_and(|g| !g.is_empty());
        if !supplied {
            subject.grade = Some(subject_grade(subject).to_string());
        }
    }
}

/// `round(100 * present / school_days)`, or 0 when school days are unknown or zero.
pub fn attendance_percentage(present_days: i32, school_days: Option<i32>) -> i32 {
    match school_days {
        Some(days) if days > 0 => {
            let pct = (f64::from(present_days.max(0)) * 100.0 / f64::from(days)).round();
            pct.clamp(0.0, 100.0) as i32
        }
        _ => 0,
    }
}

/// Class name shown as "promoted to".
///
/// Increments the first run of digits in the class name ("8" -> "9",
/// "Class 8A" -> "Class 9A"). Names without digits are returned unchanged.
/// Returns `None` when the student was not promoted.
pub fn promotion_label(class_name: &str, promoted: bool) -> Option<String> {
    if !promoted {
        return None;
    }

    let Some(start) = class_name.find(|c: char| c.is_ascii_digit()) else {
        return Some(class_name.to_string());
    };
    let end = class_name[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(class_name.len(), |offset| start + offset);

    match class_name[start..end].parse::<u64>() {
        Ok(n) => Some(format!(
            "{}{}{}",
            &class_name[..start],
            n.saturating_add(1),
            &class_name[end..]
        )),
        Err(_) => Some(class_name.to_string()),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
