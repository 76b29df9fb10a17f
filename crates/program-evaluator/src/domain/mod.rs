//! Tenant-scoped entities shared by the analytics core and the catalog service.

mod program;
mod student;

pub use program::{
    AssessmentCriterion, CustomMetric, Program, ProgramMetricsSnapshot, ProgramStatus,
};
pub use student::{
    AcademicProfile, Assessment, AssessmentKind, AttendanceRecord, AttendanceStatus, Goal,
    GoalStatus, LearningProfile, Milestone, PerformanceMetrics, PersonalInfo, ProgressTracking,
    Student, StudentStatus,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant isolation boundary; every program and student belongs to exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

/// Identifier wrapper for programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId(pub String);

/// Identifier wrapper for student documents (not the institution's student number).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
