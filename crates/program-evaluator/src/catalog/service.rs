use std::collections::HashMap;
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::query::{Page, ProgramQuery};
use super::repository::{ProgramRepository, RepositoryError, StudentRepository};
use crate::analytics::{
    AdvisoryRecommendation, InvalidTimeframe, OrganizationDashboard, ProgramAnalytics,
    ProgramEffectiveness, ProgramMetricsEntry, ProgramReport, StudentPerformance, Timeframe,
};
use crate::data::{
    parse_student_csv, program_report_csv, students_csv, DataExportError, DataImportError,
    ImportRowError, ImportSummary, StudentExportFilter,
};
use crate::domain::{
    AssessmentCriterion, CustomMetric, OrganizationId, Program, ProgramId, ProgramMetricsSnapshot,
    ProgramStatus, Student, StudentId,
};

/// Payload for creating a program. Required fields are checked by the service, not the decoder.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProgram {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub program_type: Option<String>,
    pub status: Option<ProgramStatus>,
    pub metrics: Option<ProgramMetricsSnapshot>,
    pub custom_metrics: Vec<CustomMetric>,
    pub assessment_criteria: Vec<AssessmentCriterion>,
}

/// Partial update; absent fields are left untouched and populated metric fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgramUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub program_type: Option<String>,
    pub status: Option<ProgramStatus>,
    pub metrics: Option<ProgramMetricsSnapshot>,
    pub custom_metrics: Option<Vec<CustomMetric>>,
    pub assessment_criteria: Option<Vec<AssessmentCriterion>>,
}

impl ProgramUpdate {
    fn apply_to(self, program: &mut Program) -> Result<(), CatalogError> {
        if let Some(name) = self.name {
            program.name = required("name", Some(name))?;
        }
        if let Some(program_type) = self.program_type {
            program.program_type = required("type", Some(program_type))?;
        }
        if let Some(description) = self.description {
            program.description = Some(description);
        }
        if let Some(status) = self.status {
            program.status = status;
        }
        if let Some(metrics) = self.metrics {
            let current = &mut program.metrics;
            current.effectiveness_score = metrics.effectiveness_score.or(current.effectiveness_score);
            current.student_satisfaction =
                metrics.student_satisfaction.or(current.student_satisfaction);
            current.average_performance =
                metrics.average_performance.or(current.average_performance);
            current.completion_rate = metrics.completion_rate.or(current.completion_rate);
            current.validate().map_err(CatalogError::Validation)?;
        }
        if let Some(custom_metrics) = self.custom_metrics {
            program.custom_metrics = custom_metrics;
        }
        if let Some(assessment_criteria) = self.assessment_criteria {
            program.assessment_criteria = assessment_criteria;
        }
        Ok(())
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, CatalogError> {
    match value.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CatalogError::Validation(format!("{field} is required"))),
    }
}

/// Tenant-scoped program and student operations backed by the analytics engine.
pub struct CatalogService<P, S> {
    programs: Arc<P>,
    students: Arc<S>,
    analytics: Arc<ProgramAnalytics>,
}

static PROGRAM_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static STUDENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_program_id() -> ProgramId {
    let id = PROGRAM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProgramId(format!("prg-{id:06}"))
}

fn next_student_id() -> StudentId {
    let id = STUDENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    StudentId(format!("stu-{id:06}"))
}

impl<P, S> CatalogService<P, S>
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    pub fn new(programs: Arc<P>, students: Arc<S>, analytics: ProgramAnalytics) -> Self {
        Self {
            programs,
            students,
            analytics: Arc::new(analytics),
        }
    }

    pub fn analytics(&self) -> &ProgramAnalytics {
        &self.analytics
    }

    pub fn create_program(
        &self,
        organization_id: &OrganizationId,
        payload: NewProgram,
    ) -> Result<Program, CatalogError> {
        let name = required("name", payload.name)?;
        let program_type = required("type", payload.program_type)?;
        let metrics = payload.metrics.unwrap_or_default();
        metrics.validate().map_err(CatalogError::Validation)?;

        let now = Utc::now();
        let program = Program {
            id: next_program_id(),
            organization_id: organization_id.clone(),
            name,
            description: payload.description,
            program_type,
            status: payload.status.unwrap_or_default(),
            metrics,
            custom_metrics: payload.custom_metrics,
            assessment_criteria: payload.assessment_criteria,
            created_at: now,
            updated_at: now,
        };

        let stored = self.programs.insert(program)?;
        info!(organization_id = %organization_id, program_id = %stored.id, "program created");
        Ok(stored)
    }

    pub fn list_programs(
        &self,
        organization_id: &OrganizationId,
        query: &ProgramQuery,
    ) -> Result<Page<Program>, CatalogError> {
        let programs = self.programs.list(organization_id)?;
        query.apply(programs).map_err(CatalogError::Validation)
    }

    pub fn get_program(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<Program, CatalogError> {
        self.programs
            .fetch(organization_id, program_id)?
            .ok_or(CatalogError::ProgramNotFound)
    }

    pub fn update_program(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
        update: ProgramUpdate,
    ) -> Result<Program, CatalogError> {
        let mut program = self.get_program(organization_id, program_id)?;
        update.apply_to(&mut program)?;
        program.updated_at = Utc::now();
        let stored = self.programs.update(program)?;
        info!(organization_id = %organization_id, program_id = %stored.id, "program updated");
        Ok(stored)
    }

    fn program_with_students(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<(Program, Vec<Student>), CatalogError> {
        let program = self.get_program(organization_id, program_id)?;
        let students = self.students.enrolled_in(organization_id, program_id)?;
        Ok((program, students))
    }

    pub fn effectiveness(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<ProgramEffectiveness, CatalogError> {
        let (program, students) = self.program_with_students(organization_id, program_id)?;
        Ok(self.analytics.effectiveness(&program, &students))
    }

    /// Builds the performance report; `timeframe` defaults to six months when absent.
    pub fn report(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
        timeframe: Option<&str>,
    ) -> Result<ProgramReport, CatalogError> {
        let (program, students) = self.program_with_students(organization_id, program_id)?;
        let timeframe = match timeframe {
            Some(raw) => raw.parse::<Timeframe>()?,
            None => Timeframe::default(),
        };
        Ok(self.analytics.build_report(&program, &students, timeframe))
    }

    pub fn program_recommendations(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<Vec<AdvisoryRecommendation>, CatalogError> {
        let (program, students) = self.program_with_students(organization_id, program_id)?;
        Ok(self.analytics.program_recommendations(&program, &students))
    }

    pub fn student_performance(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
        student_id: &StudentId,
    ) -> Result<StudentPerformance, CatalogError> {
        let program = self.programs.fetch(organization_id, program_id)?;
        let student = self.students.fetch(organization_id, student_id)?;
        match (program, student) {
            (Some(program), Some(student)) if student.is_enrolled_in(&program.id) => {
                Ok(self.analytics.student_performance(&student, &program.id))
            }
            _ => Err(CatalogError::EnrollmentNotFound),
        }
    }

    /// Stores a full student document in the tenant. The id of a student with the same number is
    /// reused; otherwise a fresh id is assigned.
    pub fn register_student(
        &self,
        organization_id: &OrganizationId,
        mut student: Student,
    ) -> Result<Student, CatalogError> {
        let personal = &mut student.personal_info;
        personal.first_name = required("personalInfo.firstName", Some(personal.first_name.clone()))?;
        personal.last_name = required("personalInfo.lastName", Some(personal.last_name.clone()))?;
        personal.student_id = required("personalInfo.studentId", Some(personal.student_id.clone()))?;

        for program_id in &student.program_ids {
            if self.programs.fetch(organization_id, program_id)?.is_none() {
                return Err(CatalogError::Validation(format!(
                    "program {program_id} does not belong to this organization"
                )));
            }
        }

        let existing = self
            .students
            .find_by_number(organization_id, &student.personal_info.student_id)?;
        // Only the student number selects an existing document; the submitted id is ignored.
        student.id = match existing {
            Some(existing) => existing.id,
            None => next_student_id(),
        };
        student.organization_id = organization_id.clone();

        let stored = self.students.upsert(student)?;
        info!(organization_id = %organization_id, student_id = %stored.id, "student registered");
        Ok(stored)
    }

    pub fn get_student(
        &self,
        organization_id: &OrganizationId,
        student_id: &StudentId,
    ) -> Result<Student, CatalogError> {
        self.students
            .fetch(organization_id, student_id)?
            .ok_or(CatalogError::StudentNotFound)
    }

    pub fn student_recommendations(
        &self,
        organization_id: &OrganizationId,
        student_id: &StudentId,
        program_id: Option<&ProgramId>,
    ) -> Result<Vec<AdvisoryRecommendation>, CatalogError> {
        if let Some(program_id) = program_id {
            self.get_program(organization_id, program_id)?;
        }
        let student = self.get_student(organization_id, student_id)?;
        Ok(self.analytics.student_recommendations(&student, program_id))
    }

    /// Imports a CSV upload row by row. Invalid rows are reported and skipped; valid rows are upserted.
    pub fn import_students<R: Read>(
        &self,
        organization_id: &OrganizationId,
        reader: R,
        program_id: Option<&ProgramId>,
    ) -> Result<ImportSummary, CatalogError> {
        if let Some(program_id) = program_id {
            self.get_program(organization_id, program_id)?;
        }

        let records = parse_student_csv(reader)?;
        let today = Utc::now().date_naive();
        let mut errors = Vec::new();
        let mut students = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let row = index + 2;
            let parsed = match record.validate() {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!(organization_id = %organization_id, row, %error, "skipping invalid import row");
                    errors.push(ImportRowError { row, error, record });
                    continue;
                }
            };

            let mut student = match self
                .students
                .find_by_number(organization_id, &parsed.student_number)?
            {
                Some(existing) => existing,
                None => Student {
                    id: next_student_id(),
                    organization_id: organization_id.clone(),
                    ..Student::default()
                },
            };
            parsed.apply_to(&mut student, program_id, today);
            students.push(self.students.upsert(student)?);
        }

        info!(
            organization_id = %organization_id,
            imported = students.len(),
            rejected = errors.len(),
            "student import finished"
        );

        Ok(ImportSummary {
            success: true,
            imported: students.len(),
            errors,
            students,
        })
    }

    pub fn export_students(
        &self,
        organization_id: &OrganizationId,
        filter: &StudentExportFilter,
    ) -> Result<String, CatalogError> {
        let program_names: HashMap<ProgramId, String> = self
            .programs
            .list(organization_id)?
            .into_iter()
            .map(|program| (program.id, program.name))
            .collect();
        let students: Vec<Student> = self
            .students
            .list(organization_id)?
            .into_iter()
            .filter(|student| filter.matches(student))
            .collect();
        Ok(students_csv(&students, &program_names)?)
    }

    pub fn export_program_report(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<String, CatalogError> {
        let (program, students) = self.program_with_students(organization_id, program_id)?;
        Ok(program_report_csv(&program.id, &students)?)
    }

    pub fn analytics_programs(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<ProgramMetricsEntry>, CatalogError> {
        let programs = self.programs.list(organization_id)?;
        let mut entries = Vec::with_capacity(programs.len());
        for program in &programs {
            let students = self.students.enrolled_in(organization_id, &program.id)?;
            entries.push(self.analytics.program_entry(program, &students));
        }
        Ok(entries)
    }

    pub fn dashboard(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<OrganizationDashboard, CatalogError> {
        let programs = self.programs.list(organization_id)?;
        let students = self.students.list(organization_id)?;
        Ok(self.analytics.dashboard(&programs, &students))
    }
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Program not found")]
    ProgramNotFound,
    #[error("Student not found")]
    StudentNotFound,
    #[error("Program or student not found")]
    EnrollmentNotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Timeframe(#[from] InvalidTimeframe),
    #[error(transparent)]
    Import(#[from] DataImportError),
    #[error(transparent)]
    Export(#[from] DataExportError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CatalogError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ProgramNotFound | Self::StudentNotFound | Self::EnrollmentNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Validation(_) | Self::Timeframe(_) | Self::Import(_) => StatusCode::BAD_REQUEST,
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Export(_) | Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
