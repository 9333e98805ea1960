//! UI Bridge Module
//!
//! Defines the communication protocol between the input loop and the
//! async Tokio runtime.

use thiserror::Error;

/// Commands sent from the input loop to the async runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Start or stop watching the clock.
    ToggleWatching,

    /// Raise the demonstration error.
    CreateError,

    /// Clear the error slot.
    ClearErrors,

    /// Create a student record.
    AddStudent {
        /// Service credential.
        password: String,
        /// Name as typed.
        student_name: String,
    },

    /// Record a grade for a student.
    AddGrade {
        /// Service credential.
        password: String,
        /// Student id as typed.
        student_id: String,
        /// Grade as typed.
        course_grade: String,
        /// Course name as typed.
        course_name: String,
    },

    /// Look up a transcript.
    ViewTranscript {
        /// Service credential.
        password: String,
        /// Student id as typed.
        student_id: String,
    },

    /// Show the command list.
    Help,

    /// Leave the application.
    Quit,
}

/// Input lines that do not form a command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// First word is not a command.
    #[error("unknown command '{0}', type h for help")]
    Unknown(String),

    /// Required arguments are missing.
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl UiCommand {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    ///
    /// Free-text arguments (student and course names) take the rest of the
    /// line, so they may contain spaces.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown words and missing passwords.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(None);
        };

        let command = match word {
            "w" | "watch" => Self::ToggleWatching,
            "e" | "error" => Self::CreateError,
            "c" | "clear" => Self::ClearErrors,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            "student" => {
                let (password, name) =
                    split_word(rest).ok_or(CommandError::Usage("student <password> <name>"))?;
                Self::AddStudent {
                    password: password.to_string(),
                    student_name: name.to_string(),
                }
            }
            "grade" => {
                let (password, rest) = split_word(rest)
                    .ok_or(CommandError::Usage("grade <password> <id> <grade> <course>"))?;
                let (student_id, rest) = split_word(rest).unwrap_or_default();
                let (course_grade, course_name) = split_word(rest).unwrap_or_default();
                Self::AddGrade {
                    password: password.to_string(),
                    student_id: student_id.to_string(),
                    course_grade: course_grade.to_string(),
                    course_name: course_name.to_string(),
                }
            }
            "transcript" => {
                let (password, rest) =
                    split_word(rest).ok_or(CommandError::Usage("transcript <password> <id>"))?;
                Self::ViewTranscript {
                    password: password.to_string(),
                    student_id: rest.to_string(),
                }
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Splits off the first whitespace-separated word.
fn split_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    Some(match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    })
}

/// Updates sent from background tasks to the output loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// Result of a records request, one entry per line.
    Notice(Vec<String>),

    /// A request or input line failed.
    Failure(String),
}
