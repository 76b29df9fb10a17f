use super::config::PerformanceBands;
use super::report::ProgramEffectiveness;
use crate::domain::{Program, ProgramId, ProgramStatus, Student, StudentStatus};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_programs: usize,
    pub total_students: usize,
    pub active_programs: usize,
    pub active_students: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDistribution {
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub needs_improvement: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDashboard {
    pub summary: DashboardSummary,
    pub program_types: BTreeMap<String, usize>,
    pub performance_distribution: PerformanceDistribution,
}

/// Per-program entry of the organization-wide analytics listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramMetricsEntry {
    pub program_id: ProgramId,
    pub name: String,
    #[serde(rename = "type")]
    pub program_type: String,
    pub metrics: ProgramEffectiveness,
}

pub(crate) fn organization_dashboard(
    programs: &[Program],
    students: &[Student],
    bands: &PerformanceBands,
) -> OrganizationDashboard {
    let summary = DashboardSummary {
        total_programs: programs.len(),
        total_students: students.len(),
        active_programs: programs
            .iter()
            .filter(|program| program.status == ProgramStatus::Active)
            .count(),
        active_students: students
            .iter()
            .filter(|student| student.academic_profile.status == StudentStatus::Active)
            .count(),
    };

    let mut program_types = BTreeMap::new();
    for program in programs {
        *program_types.entry(program.program_type.clone()).or_insert(0) += 1;
    }

    let mut distribution = PerformanceDistribution::default();
    // Students without a recorded GPA fall outside every band.
    for gpa in students.iter().filter_map(Student::overall_gpa) {
        if gpa >= bands.excellent {
            distribution.excellent += 1;
        } else if gpa >= bands.good {
            distribution.good += 1;
        } else if gpa >= bands.average {
            distribution.average += 1;
        } else {
            distribution.needs_improvement += 1;
        }
    }

    OrganizationDashboard {
        summary,
        program_types,
        performance_distribution: distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrganizationId;
    use chrono::{TimeZone, Utc};

    fn program(name: &str, program_type: &str, status: ProgramStatus) -> Program {
        let at = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).single().expect("valid time");
        Program {
            id: ProgramId(format!("prg-{name}")),
            organization_id: OrganizationId("org-1".to_string()),
            name: name.to_string(),
            description: None,
            program_type: program_type.to_string(),
            status,
            metrics: Default::default(),
            custom_metrics: Vec::new(),
            assessment_criteria: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    fn student(gpa: Option<f64>, status: StudentStatus) -> Student {
        let mut student = Student::default();
        student.academic_profile.performance_metrics.overall_gpa = gpa;
        student.academic_profile.status = status;
        student
    }

    #[test]
    fn buckets_students_by_gpa_band() {
        let programs = vec![
            program("algebra", "academic", ProgramStatus::Active),
            program("robotics", "enrichment", ProgramStatus::Archived),
            program("geometry", "academic", ProgramStatus::Active),
        ];
        let students = vec![
            student(Some(3.9), StudentStatus::Active),
            student(Some(3.5), StudentStatus::Active),
            student(Some(3.2), StudentStatus::Graduated),
            student(Some(2.0), StudentStatus::Active),
            student(Some(1.4), StudentStatus::Withdrawn),
            student(None, StudentStatus::Active),
        ];

        let dashboard = organization_dashboard(&programs, &students, &PerformanceBands::default());

        assert_eq!(dashboard.summary.total_programs, 3);
        assert_eq!(dashboard.summary.active_programs, 2);
        assert_eq!(dashboard.summary.total_students, 6);
        assert_eq!(dashboard.summary.active_students, 4);
        assert_eq!(dashboard.program_types.get("academic"), Some(&2));
        assert_eq!(dashboard.program_types.get("enrichment"), Some(&1));
        assert_eq!(
            dashboard.performance_distribution,
            PerformanceDistribution {
                excellent: 2,
                good: 1,
                average: 1,
                needs_improvement: 1,
            }
        );
    }
}
