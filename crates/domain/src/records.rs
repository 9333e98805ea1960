//! Student record types and input validation.
//!
//! Inputs arrive as raw text from the user. They are validated here before
//! any request is built, and the numeric fields must be written in their
//! canonical form (`7`, not `007` or `+7`).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected user input for a records operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Student name is blank.
    #[error("Student name must be non-empty")]
    EmptyStudentName,

    /// Student ID is not a canonical non-negative integer.
    #[error("Student ID is invalid")]
    InvalidStudentId,

    /// Grade is not a canonical number between 0 and 100.
    #[error("Course grade is not valid")]
    InvalidGrade,

    /// Course name is blank.
    #[error("Course name is required")]
    EmptyCourseName,
}

/// Identifier assigned to a student by the records service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(u64);

impl StudentId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parses a user-entered id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidStudentId`] unless the input is a
    /// non-negative integer in canonical decimal form.
    pub fn parse(input: &str) -> Result<Self, RecordError> {
        let id: u64 = input.parse().map_err(|_| RecordError::InvalidStudentId)?;
        if id.to_string() != input {
            return Err(RecordError::InvalidStudentId);
        }
        Ok(Self(id))
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A course grade between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseGrade(f64);

impl CourseGrade {
    /// Returns the raw grade.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Parses a user-entered grade.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidGrade`] unless the input is a finite
    /// number in `0..=100` written in canonical form.
    pub fn parse(input: &str) -> Result<Self, RecordError> {
        let grade: f64 = input.parse().map_err(|_| RecordError::InvalidGrade)?;
        if !grade.is_finite()
            || grade.is_sign_negative()
            || grade > 100.0
            || grade.to_string() != input
        {
            return Err(RecordError::InvalidGrade);
        }
        Ok(Self(grade))
    }
}

impl fmt::Display for CourseGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validates a student name.
///
/// # Errors
///
/// Returns [`RecordError::EmptyStudentName`] if the name is blank.
pub fn validate_student_name(name: &str) -> Result<&str, RecordError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecordError::EmptyStudentName);
    }
    Ok(name)
}

/// Validates a course name.
///
/// # Errors
///
/// Returns [`RecordError::EmptyCourseName`] if the name is blank.
pub fn validate_course_name(name: &str) -> Result<&str, RecordError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecordError::EmptyCourseName);
    }
    Ok(name)
}

/// A student as reported by the records service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Assigned id.
    #[serde(rename = "studentID")]
    pub id: StudentId,
    /// Display name.
    #[serde(rename = "studentName")]
    pub name: String,
}

/// One grade line of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    /// Course name.
    pub course: String,
    /// Numeric grade.
    pub grade: f64,
}

/// A student's full transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// The student.
    pub student: Student,
    /// Recorded grades.
    pub grades: Vec<GradeRecord>,
}

impl Transcript {
    /// Renders the transcript as display lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.grades.len() + 1);
        lines.push(format!(
            "Transcript for student {} (id {})",
            self.student.name, self.student.id
        ));
        lines.extend(
            self.grades
                .iter()
                .map(|g| format!("  - {} in {}", g.grade, g.course)),
        );
        lines
    }
}

/// Result of a transcript lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptLookup {
    /// No student has the requested id.
    NotFound(StudentId),
    /// The transcript was found.
    Found(Transcript),
}

impl TranscriptLookup {
    /// Renders the lookup result as display lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::NotFound(id) => vec![format!("No student exists with id {id}")],
            Self::Found(transcript) => transcript.lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn student_id_must_be_canonical() {
        assert_eq!(StudentId::parse("42"), Ok(StudentId::new(42)));
        assert_eq!(StudentId::parse("0"), Ok(StudentId::new(0)));
        for bad in ["", "-1", "007", "+7", "4.2", "abc", " 4"] {
            assert_eq!(StudentId::parse(bad), Err(RecordError::InvalidStudentId), "{bad}");
        }
    }

    #[test]
    fn grade_must_be_in_range_and_canonical() {
        assert_eq!(CourseGrade::parse("95").map(CourseGrade::get), Ok(95.0));
        assert_eq!(CourseGrade::parse("87.5").map(CourseGrade::get), Ok(87.5));
        assert_eq!(CourseGrade::parse("0").map(CourseGrade::get), Ok(0.0));
        assert_eq!(CourseGrade::parse("100").map(CourseGrade::get), Ok(100.0));
        for bad in ["100.5", "-1", "-0", ".5", "95.0", "NaN", "inf", "", "A+"] {
            assert_eq!(CourseGrade::parse(bad), Err(RecordError::InvalidGrade), "{bad}");
        }
    }

    #[test]
    fn names_must_not_be_blank() {
        assert_eq!(validate_student_name("  Ada "), Ok("Ada"));
        assert_eq!(validate_student_name("   "), Err(RecordError::EmptyStudentName));
        assert_eq!(validate_course_name(""), Err(RecordError::EmptyCourseName));
    }

    #[test]
    fn transcript_deserializes_from_wire_names() {
        let transcript: Transcript = serde_json::from_str(
            r#"{"student":{"studentID":3,"studentName":"Ada"},"grades":[{"course":"Logic","grade":98}]}"#,
        )
        .unwrap();
        assert_eq!(transcript.student.id, StudentId::new(3));
        assert_eq!(
            transcript.lines(),
            vec![
                "Transcript for student Ada (id 3)".to_string(),
                "  - 98 in Logic".to_string(),
            ]
        );
    }

    #[test]
    fn not_found_lookup_message() {
        assert_eq!(
            TranscriptLookup::NotFound(StudentId::new(9)).lines(),
            vec!["No student exists with id 9".to_string()]
        );
    }
}
