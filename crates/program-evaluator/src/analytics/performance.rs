use super::metrics::attendance_rate;
use crate::domain::{Assessment, AttendanceRecord, ProgramId, Student, StudentId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub id: StudentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgramMetrics {
    pub average_score: Option<f64>,
    pub attendance_rate: Option<f64>,
}

/// One student's record within a single program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentPerformance {
    pub student: StudentSummary,
    pub assessments: Vec<Assessment>,
    pub attendance: Vec<AttendanceRecord>,
    pub metrics: StudentProgramMetrics,
}

/// Mean assessment percentage; unscorable assessments count as zero. `None` without assessments.
pub fn assessment_average<'a, I>(assessments: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Assessment>,
{
    let (sum, count) = assessments
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), assessment| {
            (sum + assessment.percentage(), count + 1)
        });

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub(crate) fn student_performance(student: &Student, program_id: &ProgramId) -> StudentPerformance {
    let assessments: Vec<Assessment> = student.assessments_for(program_id).cloned().collect();
    let attendance: Vec<AttendanceRecord> = student.attendance_for(program_id).cloned().collect();

    let metrics = StudentProgramMetrics {
        average_score: assessment_average(&assessments),
        attendance_rate: attendance_rate(&attendance),
    };

    StudentPerformance {
        student: StudentSummary {
            id: student.id.clone(),
            name: student.display_name(),
        },
        assessments,
        attendance,
        metrics,
    }
}
