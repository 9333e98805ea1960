//! Student records use cases.
//!
//! Each operation validates the raw user input, posts it to the records
//! service and interprets the reply. Any reply may be `{ "error": "..." }`,
//! which becomes `ApplicationError::Service`.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tickwatch_domain::records::{validate_course_name, validate_student_name};
use tickwatch_domain::{
    CourseGrade, DecodeError, StudentId, Transcript, TranscriptLookup, json_type_name,
};

use crate::ApplicationResult;
use crate::error::ApplicationError;
use crate::ports::RecordsGateway;

const ADD_STUDENT: &str = "/api/addStudent";
const ADD_GRADE: &str = "/api/addGrade";
const GET_TRANSCRIPT: &str = "/api/getTranscript";

/// Input for creating a student record.
#[derive(Debug, Clone)]
pub struct AddStudentInput {
    /// Service credential.
    pub password: String,
    /// Name as typed by the user.
    pub student_name: String,
}

/// Output from creating a student record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddStudentOutput {
    /// Id assigned by the service.
    pub student_id: StudentId,
    /// The validated name.
    pub student_name: String,
}

impl fmt::Display for AddStudentOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record created for student '{}' with ID {}",
            self.student_name, self.student_id
        )
    }
}

/// Input for recording a grade.
#[derive(Debug, Clone)]
pub struct AddGradeInput {
    /// Service credential.
    pub password: String,
    /// Student id as typed by the user.
    pub student_id: String,
    /// Course name as typed by the user.
    pub course_name: String,
    /// Grade as typed by the user.
    pub course_grade: String,
}

/// Output from recording a grade.
#[derive(Debug, Clone, PartialEq)]
pub struct AddGradeOutput {
    /// The validated course name.
    pub course_name: String,
    /// The validated grade.
    pub course_grade: CourseGrade,
}

impl fmt::Display for AddGradeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Added grade of {} in {} successfully!",
            self.course_grade, self.course_name
        )
    }
}

/// Input for viewing a transcript.
#[derive(Debug, Clone)]
pub struct ViewTranscriptInput {
    /// Service credential.
    pub password: String,
    /// Student id as typed by the user.
    pub student_id: String,
}

/// Use case for the student records flow.
pub struct StudentRecords<G: RecordsGateway> {
    gateway: Arc<G>,
}

impl<G: RecordsGateway> StudentRecords<G> {
    /// Creates the use case over the given gateway.
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Creates a student record.
    ///
    /// # Errors
    ///
    /// Returns `Record` for blank names, `Service` when the service refuses,
    /// and `Validation`/`Transport` for malformed or failed exchanges.
    pub async fn add_student(&self, input: AddStudentInput) -> ApplicationResult<AddStudentOutput> {
        let name = validate_student_name(&input.student_name)?.to_string();
        let reply = self
            .gateway
            .post(
                ADD_STUDENT,
                json!({ "password": input.password, "studentName": name }),
            )
            .await?;
        let obj = service_reply(&reply)?;
        let id = obj
            .get("studentID")
            .ok_or(DecodeError::MissingField("studentID"))?
            .as_u64()
            .ok_or(DecodeError::WrongType {
                field: "studentID",
                expected: "a non-negative integer",
            })?;
        Ok(AddStudentOutput {
            student_id: StudentId::new(id),
            student_name: name,
        })
    }

    /// Records a grade for an existing student.
    ///
    /// # Errors
    ///
    /// Returns `Record` for invalid ids, grades or course names, and the
    /// same service/transport errors as [`StudentRecords::add_student`].
    pub async fn add_grade(&self, input: AddGradeInput) -> ApplicationResult<AddGradeOutput> {
        let student_id = StudentId::parse(input.student_id.trim())?;
        let course_grade = CourseGrade::parse(input.course_grade.trim())?;
        let course_name = validate_course_name(&input.course_name)?.to_string();

        let reply = self
            .gateway
            .post(
                ADD_GRADE,
                json!({
                    "password": input.password,
                    "studentID": student_id,
                    "courseName": course_name,
                    "courseGrade": course_grade,
                }),
            )
            .await?;
        let obj = service_reply(&reply)?;
        if obj.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(DecodeError::WrongType {
                field: "success",
                expected: "true",
            }
            .into());
        }
        Ok(AddGradeOutput {
            course_name,
            course_grade,
        })
    }

    /// Looks up a student's transcript.
    ///
    /// # Errors
    ///
    /// Returns `Record` for invalid ids and the same service/transport
    /// errors as [`StudentRecords::add_student`].
    pub async fn view_transcript(
        &self,
        input: ViewTranscriptInput,
    ) -> ApplicationResult<TranscriptLookup> {
        let student_id = StudentId::parse(input.student_id.trim())?;
        let reply = self
            .gateway
            .post(
                GET_TRANSCRIPT,
                json!({ "password": input.password, "studentID": student_id }),
            )
            .await?;
        let obj = service_reply(&reply)?;
        let success = obj
            .get("success")
            .ok_or(DecodeError::MissingField("success"))?
            .as_bool()
            .ok_or(DecodeError::WrongType {
                field: "success",
                expected: "a boolean",
            })?;
        if !success {
            return Ok(TranscriptLookup::NotFound(student_id));
        }
        let transcript = obj
            .get("transcript")
            .ok_or(DecodeError::MissingField("transcript"))?;
        let transcript: Transcript =
            serde_json::from_value(transcript.clone()).map_err(|_| DecodeError::WrongType {
                field: "transcript",
                expected: "a transcript object",
            })?;
        Ok(TranscriptLookup::Found(transcript))
    }
}

/// Splits a service reply into its error message or its success object.
fn service_reply(reply: &Value) -> ApplicationResult<&Map<String, Value>> {
    let obj = reply
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject(json_type_name(reply)))?;
    if let Some(message) = obj.get("error").and_then(Value::as_str) {
        return Err(ApplicationError::Service(message.to_string()));
    }
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::future::Future;
    use std::sync::Mutex;
    use tickwatch_domain::RecordError;

    /// Replies with a fixed value and remembers every request.
    struct ScriptedGateway {
        reply: Value,
        calls: Mutex<Vec<(&'static str, Value)>>,
    }

    impl ScriptedGateway {
        fn replying(reply: Value) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(&'static str, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RecordsGateway for ScriptedGateway {
        fn post(
            &self,
            endpoint: &'static str,
            body: Value,
        ) -> impl Future<Output = ApplicationResult<Value>> + Send {
            self.calls.lock().unwrap().push((endpoint, body));
            let reply = self.reply.clone();
            async move { Ok(reply) }
        }
    }

    #[tokio::test]
    async fn add_student_posts_trimmed_name() {
        let gateway = ScriptedGateway::replying(json!({ "studentID": 17 }));
        let records = StudentRecords::new(Arc::clone(&gateway));

        let out = records
            .add_student(AddStudentInput {
                password: "pw".into(),
                student_name: "  Ada Lovelace ".into(),
            })
            .await
            .unwrap();

        assert_eq!(
            out.to_string(),
            "Record created for student 'Ada Lovelace' with ID 17"
        );
        assert_eq!(
            gateway.calls(),
            vec![(
                "/api/addStudent",
                json!({ "password": "pw", "studentName": "Ada Lovelace" })
            )]
        );
    }

    #[tokio::test]
    async fn blank_name_never_reaches_the_service() {
        let gateway = ScriptedGateway::replying(json!({ "studentID": 1 }));
        let records = StudentRecords::new(Arc::clone(&gateway));
        let err = records
            .add_student(AddStudentInput {
                password: "pw".into(),
                student_name: " ".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, ApplicationError::Record(RecordError::EmptyStudentName));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn service_errors_are_reported_verbatim() {
        let gateway = ScriptedGateway::replying(json!({ "error": "Wrong password" }));
        let records = StudentRecords::new(gateway);
        let err = records
            .add_student(AddStudentInput {
                password: "nope".into(),
                student_name: "Ada".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Wrong password");
    }

    #[tokio::test]
    async fn non_object_reply_names_its_type() {
        let records = StudentRecords::new(ScriptedGateway::replying(json!("created")));
        let err = records
            .add_student(AddStudentInput {
                password: "pw".into(),
                student_name: "Ada".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApplicationError::Validation(DecodeError::NotAnObject("a string"))
        );
        assert_eq!(
            err.to_string(),
            "invalid payload: expected a JSON object, got a string"
        );
    }

    #[tokio::test]
    async fn add_grade_sends_typed_numbers() {
        let gateway = ScriptedGateway::replying(json!({ "success": true }));
        let records = StudentRecords::new(Arc::clone(&gateway));

        let out = records
            .add_grade(AddGradeInput {
                password: "pw".into(),
                student_id: "4".into(),
                course_name: "Compilers".into(),
                course_grade: "92.5".into(),
            })
            .await
            .unwrap();

        assert_eq!(out.to_string(), "Added grade of 92.5 in Compilers successfully!");
        assert_eq!(
            gateway.calls()[0].1,
            json!({
                "password": "pw",
                "studentID": 4,
                "courseName": "Compilers",
                "courseGrade": 92.5
            })
        );
    }

    #[tokio::test]
    async fn add_grade_validates_in_order() {
        let gateway = ScriptedGateway::replying(json!({ "success": true }));
        let records = StudentRecords::new(Arc::clone(&gateway));
        let input = |id: &str, course: &str, grade: &str| AddGradeInput {
            password: "pw".into(),
            student_id: id.into(),
            course_name: course.into(),
            course_grade: grade.into(),
        };

        assert_eq!(
            records.add_grade(input("x", "", "101")).await.unwrap_err(),
            ApplicationError::Record(RecordError::InvalidStudentId)
        );
        assert_eq!(
            records.add_grade(input("1", "", "101")).await.unwrap_err(),
            ApplicationError::Record(RecordError::InvalidGrade)
        );
        assert_eq!(
            records.add_grade(input("1", "", "99")).await.unwrap_err(),
            ApplicationError::Record(RecordError::EmptyCourseName)
        );
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn transcript_not_found() {
        let gateway = ScriptedGateway::replying(json!({ "success": false }));
        let records = StudentRecords::new(gateway);
        let lookup = records
            .view_transcript(ViewTranscriptInput {
                password: "pw".into(),
                student_id: "8".into(),
            })
            .await
            .unwrap();
        assert_eq!(lookup, TranscriptLookup::NotFound(StudentId::new(8)));
    }

    #[tokio::test]
    async fn transcript_found() {
        let gateway = ScriptedGateway::replying(json!({
            "success": true,
            "transcript": {
                "student": { "studentID": 8, "studentName": "Grace" },
                "grades": [
                    { "course": "Navy", "grade": 100 },
                    { "course": "COBOL", "grade": 97.5 }
                ]
            }
        }));
        let records = StudentRecords::new(gateway);
        let lookup = records
            .view_transcript(ViewTranscriptInput {
                password: "pw".into(),
                student_id: "8".into(),
            })
            .await
            .unwrap();
        assert_eq!(
            lookup.lines(),
            vec![
                "Transcript for student Grace (id 8)".to_string(),
                "  - 100 in Navy".to_string(),
                "  - 97.5 in COBOL".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn malformed_transcript_is_a_validation_error() {
        let gateway = ScriptedGateway::replying(json!({ "success": true, "transcript": 5 }));
        let records = StudentRecords::new(gateway);
        let err = records
            .view_transcript(ViewTranscriptInput {
                password: "pw".into(),
                student_id: "8".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }
}
