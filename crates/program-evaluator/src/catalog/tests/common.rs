use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::analytics::ProgramAnalytics;
use crate::catalog::repository::{ProgramRepository, RepositoryError, StudentRepository};
use crate::catalog::{catalog_router, CatalogService};
use crate::domain::{
    Assessment, AssessmentKind, AttendanceRecord, AttendanceStatus, Goal, GoalStatus,
    OrganizationId, Program, ProgramId, ProgramMetricsSnapshot, ProgramStatus, Student, StudentId,
};

pub(super) const ORG: &str = "org-north";
pub(super) const OTHER_ORG: &str = "org-south";

pub(super) fn org() -> OrganizationId {
    OrganizationId(ORG.to_string())
}

pub(super) fn other_org() -> OrganizationId {
    OrganizationId(OTHER_ORG.to_string())
}

#[derive(Default, Clone)]
pub(super) struct MemoryPrograms {
    records: Arc<Mutex<HashMap<ProgramId, Program>>>,
}

impl ProgramRepository for MemoryPrograms {
    fn insert(&self, program: Program) -> Result<Program, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&program.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(program.id.clone(), program.clone());
        Ok(program)
    }

    fn update(&self, program: Program) -> Result<Program, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&program.id) {
            Some(existing) => {
                *existing = program.clone();
                Ok(program)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(
        &self,
        organization_id: &OrganizationId,
        id: &ProgramId,
    ) -> Result<Option<Program>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(id)
            .filter(|program| &program.organization_id == organization_id)
            .cloned())
    }

    fn list(&self, organization_id: &OrganizationId) -> Result<Vec<Program>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut programs: Vec<Program> = guard
            .values()
            .filter(|program| &program.organization_id == organization_id)
            .cloned()
            .collect();
        programs.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(programs)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStudents {
    records: Arc<Mutex<HashMap<StudentId, Student>>>,
}

impl MemoryStudents {
    fn scoped(&self, organization_id: &OrganizationId) -> Vec<Student> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut students: Vec<Student> = guard
            .values()
            .filter(|student| &student.organization_id == organization_id)
            .cloned()
            .collect();
        students.sort_by(|left, right| left.id.cmp(&right.id));
        students
    }
}

impl StudentRepository for MemoryStudents {
    fn upsert(&self, student: Student) -> Result<Student, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(student.id.clone(), student.clone());
        Ok(student)
    }

    fn fetch(
        &self,
        organization_id: &OrganizationId,
        id: &StudentId,
    ) -> Result<Option<Student>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(id)
            .filter(|student| &student.organization_id == organization_id)
            .cloned())
    }

    fn find_by_number(
        &self,
        organization_id: &OrganizationId,
        student_number: &str,
    ) -> Result<Option<Student>, RepositoryError> {
        Ok(self
            .scoped(organization_id)
            .into_iter()
            .find(|student| student.personal_info.student_id == student_number))
    }

    fn enrolled_in(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<Vec<Student>, RepositoryError> {
        Ok(self
            .scoped(organization_id)
            .into_iter()
            .filter(|student| student.is_enrolled_in(program_id))
            .collect())
    }

    fn list(&self, organization_id: &OrganizationId) -> Result<Vec<Student>, RepositoryError> {
        Ok(self.scoped(organization_id))
    }
}

pub(super) struct UnavailablePrograms;

impl ProgramRepository for UnavailablePrograms {
    fn insert(&self, _program: Program) -> Result<Program, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _program: Program) -> Result<Program, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _organization_id: &OrganizationId,
        _id: &ProgramId,
    ) -> Result<Option<Program>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _organization_id: &OrganizationId) -> Result<Vec<Program>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryService = CatalogService<MemoryPrograms, MemoryStudents>;

pub(super) fn build_service() -> (MemoryService, MemoryPrograms, MemoryStudents) {
    let programs = MemoryPrograms::default();
    let students = MemoryStudents::default();
    let service = CatalogService::new(
        Arc::new(programs.clone()),
        Arc::new(students.clone()),
        ProgramAnalytics::default(),
    );
    (service, programs, students)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    catalog_router(Arc::new(service))
}

pub(super) fn program(id: &str, organization_id: OrganizationId, name: &str) -> Program {
    let created = Utc
        .with_ymd_and_hms(2024, 9, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp");
    Program {
        id: ProgramId(id.to_string()),
        organization_id,
        name: name.to_string(),
        description: Some("Weekday after-school cohort".to_string()),
        program_type: "academic".to_string(),
        status: ProgramStatus::Active,
        metrics: ProgramMetricsSnapshot::default(),
        custom_metrics: Vec::new(),
        assessment_criteria: Vec::new(),
        created_at: created,
        updated_at: created,
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Student with a 3.0 GPA, two of two goals completed, and a single attended session in `program_id`.
pub(super) fn enrolled_student(id: &str, number: &str, program_id: &ProgramId) -> Student {
    let mut student = Student {
        id: StudentId(id.to_string()),
        organization_id: org(),
        program_ids: vec![program_id.clone()],
        ..Student::default()
    };
    student.personal_info.first_name = "Maya".to_string();
    student.personal_info.last_name = "Lopez".to_string();
    student.personal_info.student_id = number.to_string();
    student.academic_profile.performance_metrics.overall_gpa = Some(3.0);
    student.academic_profile.performance_metrics.attendance_rate = Some(100.0);
    student.attendance.push(AttendanceRecord {
        program_id: Some(program_id.clone()),
        date: Some(date(2024, 9, 3)),
        status: Some(AttendanceStatus::Present),
        notes: None,
    });
    student.assessments.push(Assessment {
        program_id: Some(program_id.clone()),
        kind: Some(AssessmentKind::Exam),
        name: Some("Unit 1".to_string()),
        score: Some(45.0),
        max_score: Some(50.0),
        date: Some(date(2024, 9, 20)),
        feedback: None,
    });
    student.progress_tracking.goals = vec![
        Goal {
            status: Some(GoalStatus::Completed),
            ..Goal::default()
        },
        Goal {
            status: Some(GoalStatus::Completed),
            ..Goal::default()
        },
    ];
    student
}

pub(super) fn seed_program(programs: &MemoryPrograms, id: &str) -> ProgramId {
    let program = program(id, org(), "Algebra Foundations");
    let program_id = program.id.clone();
    programs.insert(program).expect("seed program");
    program_id
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
