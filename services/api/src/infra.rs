use metrics_exporter_prometheus::PrometheusHandle;
use program_evaluator::catalog::{ProgramRepository, RepositoryError, StudentRepository};
use program_evaluator::domain::{OrganizationId, Program, ProgramId, Student, StudentId};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProgramRepository {
    records: Arc<Mutex<HashMap<ProgramId, Program>>>,
}

impl ProgramRepository for InMemoryProgramRepository {
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
        if guard.contains_key(&program.id) {
            guard.insert(program.id.clone(), program.clone());
            Ok(program)
        } else {
            Err(RepositoryError::NotFound)
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
pub(crate) struct InMemoryStudentRepository {
    records: Arc<Mutex<HashMap<StudentId, Student>>>,
}

impl InMemoryStudentRepository {
    fn scoped<F>(&self, organization_id: &OrganizationId, keep: F) -> Vec<Student>
    where
        F: Fn(&Student) -> bool,
    {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut students: Vec<Student> = guard
            .values()
            .filter(|student| &student.organization_id == organization_id && keep(student))
            .cloned()
            .collect();
        students.sort_by(|left, right| left.id.cmp(&right.id));
        students
    }
}

impl StudentRepository for InMemoryStudentRepository {
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
            .scoped(organization_id, |student| {
                student.personal_info.student_id == student_number
            })
            .into_iter()
            .next())
    }

    fn enrolled_in(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<Vec<Student>, RepositoryError> {
        Ok(self.scoped(organization_id, |student| student.is_enrolled_in(program_id)))
    }

    fn list(&self, organization_id: &OrganizationId) -> Result<Vec<Student>, RepositoryError> {
        Ok(self.scoped(organization_id, |_| true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, organization: &str, number: &str) -> Student {
        let mut student = Student {
            id: StudentId(id.to_string()),
            organization_id: OrganizationId(organization.to_string()),
            ..Student::default()
        };
        student.personal_info.student_id = number.to_string();
        student
    }

    #[test]
    fn student_lookups_stay_inside_the_organization() {
        let repository = InMemoryStudentRepository::default();
        repository
            .upsert(student("stu-1", "org-a", "N-1"))
            .expect("upsert");
        repository
            .upsert(student("stu-2", "org-b", "N-1"))
            .expect("upsert");

        let org_a = OrganizationId("org-a".to_string());
        let found = repository
            .find_by_number(&org_a, "N-1")
            .expect("lookup")
            .expect("present");
        assert_eq!(found.id, StudentId("stu-1".to_string()));
        assert!(repository
            .fetch(&org_a, &StudentId("stu-2".to_string()))
            .expect("lookup")
            .is_none());
        assert_eq!(repository.list(&org_a).expect("list").len(), 1);
    }

    #[test]
    fn program_updates_require_an_existing_record() {
        let repository = InMemoryProgramRepository::default();
        let now = chrono::Utc::now();
        let program = Program {
            id: ProgramId("prg-1".to_string()),
            organization_id: OrganizationId("org-a".to_string()),
            name: "Chess".to_string(),
            description: None,
            program_type: "enrichment".to_string(),
            status: Default::default(),
            metrics: Default::default(),
            custom_metrics: Vec::new(),
            assessment_criteria: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(
            repository.update(program.clone()),
            Err(RepositoryError::NotFound)
        ));
        repository.insert(program.clone()).expect("insert");
        assert!(matches!(
            repository.insert(program),
            Err(RepositoryError::Conflict)
        ));
    }
}
