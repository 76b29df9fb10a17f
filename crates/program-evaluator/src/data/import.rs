use crate::domain::{ProgramId, Student};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use std::io::Read;

/// Raw CSV row as uploaded; blank cells are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCsvRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub student_id: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<String>,
    pub grade: Option<String>,
    pub gpa: Option<String>,
    pub attendance_rate: Option<String>,
    pub enrollment_date: Option<String>,
}

/// Header positions resolved once per upload.
struct CsvColumns {
    first_name: Option<usize>,
    last_name: Option<usize>,
    student_id: Option<usize>,
    email: Option<usize>,
    date_of_birth: Option<usize>,
    grade: Option<usize>,
    gpa: Option<usize>,
    attendance_rate: Option<usize>,
    enrollment_date: Option<usize>,
}

impl CsvColumns {
    fn from_headers(headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|header| header == name);
        Self {
            first_name: position("firstName"),
            last_name: position("lastName"),
            student_id: position("studentId"),
            email: position("email"),
            date_of_birth: position("dateOfBirth"),
            grade: position("grade"),
            gpa: position("gpa"),
            attendance_rate: position("attendanceRate"),
            enrollment_date: position("enrollmentDate"),
        }
    }

    fn read(&self, row: &StringRecord) -> StudentCsvRecord {
        let cell = |index: Option<usize>| {
            index
                .and_then(|index| row.get(index))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        StudentCsvRecord {
            first_name: cell(self.first_name),
            last_name: cell(self.last_name),
            student_id: cell(self.student_id),
            email: cell(self.email),
            date_of_birth: cell(self.date_of_birth),
            grade: cell(self.grade),
            gpa: cell(self.gpa),
            attendance_rate: cell(self.attendance_rate),
            enrollment_date: cell(self.enrollment_date),
        }
    }
}

/// A row that passed validation and can be applied to a student document.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentImportRow {
    pub first_name: String,
    pub last_name: String,
    pub student_number: String,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub grade: Option<String>,
    pub gpa: Option<f64>,
    pub attendance_rate: Option<f64>,
    pub enrollment_date: Option<NaiveDate>,
}

impl StudentCsvRecord {
    pub fn validate(&self) -> Result<StudentImportRow, String> {
        let (first_name, last_name, student_number) =
            match (&self.first_name, &self.last_name, &self.student_id) {
                (Some(first), Some(last), Some(number)) => {
                    (first.clone(), last.clone(), number.clone())
                }
                _ => return Err("Missing required fields".to_string()),
            };

        Ok(StudentImportRow {
            first_name,
            last_name,
            student_number,
            email: self.email.as_ref().map(|email| email.to_ascii_lowercase()),
            date_of_birth: parse_date_field("dateOfBirth", self.date_of_birth.as_deref())?,
            grade: self.grade.clone(),
            gpa: parse_number_field("gpa", self.gpa.as_deref(), 4.0)?,
            attendance_rate: parse_number_field(
                "attendanceRate",
                self.attendance_rate.as_deref(),
                100.0,
            )?,
            enrollment_date: parse_date_field("enrollmentDate", self.enrollment_date.as_deref())?,
        })
    }
}

impl StudentImportRow {
    /// Overwrites the imported fields on `student`; blank optional cells keep existing values.
    pub fn apply_to(&self, student: &mut Student, program_id: Option<&ProgramId>, today: NaiveDate) {
        let personal = &mut student.personal_info;
        personal.first_name = self.first_name.clone();
        personal.last_name = self.last_name.clone();
        personal.student_id = self.student_number.clone();
        if self.email.is_some() {
            personal.email = self.email.clone();
        }
        if self.date_of_birth.is_some() {
            personal.date_of_birth = self.date_of_birth;
        }

        let academic = &mut student.academic_profile;
        if self.grade.is_some() {
            academic.grade = self.grade.clone();
        }
        academic.enrollment_date = self
            .enrollment_date
            .or(academic.enrollment_date)
            .or(Some(today));
        if self.gpa.is_some() {
            academic.performance_metrics.overall_gpa = self.gpa;
        }
        if self.attendance_rate.is_some() {
            academic.performance_metrics.attendance_rate = self.attendance_rate;
        }

        if let Some(program_id) = program_id {
            student.enroll(program_id);
        }
    }
}

fn parse_number_field(field: &str, raw: Option<&str>, max: f64) -> Result<Option<f64>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && (0.0..=max).contains(&value) => Ok(Some(value)),
        Ok(_) => Err(format!("{field} must be between 0 and {max}")),
        Err(_) => Err(format!("{field} '{raw}' is not a number")),
    }
}

fn parse_date_field(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| format!("{field} '{value}' must be formatted as YYYY-MM-DD"))
    })
    .transpose()
}

/// Parses the upload into raw rows. Rows may be ragged; missing trailing cells are absent.
pub fn parse_student_csv<R: Read>(reader: R) -> Result<Vec<StudentCsvRecord>, DataImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = CsvColumns::from_headers(csv_reader.headers()?);
    let mut records = Vec::new();
    for row in csv_reader.records() {
        records.push(columns.read(&row?));
    }
    Ok(records)
}

/// Per-row failure; `row` is the 1-based line number in the uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub error: String,
    pub record: StudentCsvRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub success: bool,
    pub imported: usize,
    pub errors: Vec<ImportRowError>,
    pub students: Vec<Student>,
}

#[derive(Debug, thiserror::Error)]
pub enum DataImportError {
    #[error("Import failed: {0}")]
    Csv(#[from] csv::Error),
}
