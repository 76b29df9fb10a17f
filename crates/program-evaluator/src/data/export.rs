use crate::analytics::assessment_average;
use crate::domain::{ProgramId, Student, StudentStatus};
use std::collections::HashMap;

const STUDENT_HEADERS: [&str; 10] = [
    "Student ID",
    "First Name",
    "Last Name",
    "Email",
    "Date of Birth",
    "Grade",
    "GPA",
    "Attendance Rate",
    "Programs",
    "Status",
];

const PROGRAM_REPORT_HEADERS: [&str; 6] = [
    "Student ID",
    "Student Name",
    "Overall GPA",
    "Attendance Rate",
    "Assessment Average",
    "Status",
];

/// Optional narrowing applied before a student export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentExportFilter {
    pub status: Option<StudentStatus>,
    pub grade: Option<String>,
    pub program_id: Option<ProgramId>,
}

impl StudentExportFilter {
    pub fn matches(&self, student: &Student) -> bool {
        if let Some(status) = self.status {
            if student.academic_profile.status != status {
                return false;
            }
        }
        if let Some(grade) = &self.grade {
            if student.academic_profile.grade.as_deref() != Some(grade.as_str()) {
                return false;
            }
        }
        if let Some(program_id) = &self.program_id {
            if !student.is_enrolled_in(program_id) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataExportError {
    #[error("Export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export failed: output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, DataExportError> {
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Renders students as CSV. Program names are resolved through `program_names`; unknown ids are skipped.
pub fn students_csv(
    students: &[Student],
    program_names: &HashMap<ProgramId, String>,
) -> Result<String, DataExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(STUDENT_HEADERS)?;

    for student in students {
        let personal = &student.personal_info;
        let academic = &student.academic_profile;
        let programs = student
            .program_ids
            .iter()
            .filter_map(|id| program_names.get(id).map(String::as_str))
            .collect::<Vec<_>>()
            .join("; ");

        writer.write_record([
            personal.student_id.clone(),
            personal.first_name.clone(),
            personal.last_name.clone(),
            personal.email.clone().unwrap_or_default(),
            personal
                .date_of_birth
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            academic.grade.clone().unwrap_or_default(),
            optional_number(academic.performance_metrics.overall_gpa),
            optional_number(academic.performance_metrics.attendance_rate),
            programs,
            academic.status.label().to_string(),
        ])?;
    }

    finish(writer)
}

/// Per-student summary for one program; the assessment average covers that program only.
pub fn program_report_csv(
    program_id: &ProgramId,
    students: &[Student],
) -> Result<String, DataExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PROGRAM_REPORT_HEADERS)?;

    for student in students {
        let metrics = &student.academic_profile.performance_metrics;
        writer.write_record([
            student.personal_info.student_id.clone(),
            student.display_name(),
            optional_number(metrics.overall_gpa),
            optional_number(metrics.attendance_rate),
            optional_number(assessment_average(student.assessments_for(program_id))),
            student.academic_profile.status.label().to_string(),
        ])?;
    }

    finish(writer)
}
