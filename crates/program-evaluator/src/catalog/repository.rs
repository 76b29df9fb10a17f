use crate::domain::{OrganizationId, Program, ProgramId, Student, StudentId};

/// Program storage. Every read is scoped to a single organization.
pub trait ProgramRepository: Send + Sync {
    fn insert(&self, program: Program) -> Result<Program, RepositoryError>;
    fn update(&self, program: Program) -> Result<Program, RepositoryError>;
    fn fetch(
        &self,
        organization_id: &OrganizationId,
        id: &ProgramId,
    ) -> Result<Option<Program>, RepositoryError>;
    fn list(&self, organization_id: &OrganizationId) -> Result<Vec<Program>, RepositoryError>;
}

/// Student storage keyed by document id; `find_by_number` resolves the institution's student number.
pub trait StudentRepository: Send + Sync {
    fn upsert(&self, student: Student) -> Result<Student, RepositoryError>;
    fn fetch(
        &self,
        organization_id: &OrganizationId,
        id: &StudentId,
    ) -> Result<Option<Student>, RepositoryError>;
    fn find_by_number(
        &self,
        organization_id: &OrganizationId,
        student_number: &str,
    ) -> Result<Option<Student>, RepositoryError>;
    fn enrolled_in(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<Vec<Student>, RepositoryError>;
    fn list(&self, organization_id: &OrganizationId) -> Result<Vec<Student>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
