use crate::domain::{AttendanceRecord, GoalStatus, ProgramId, Student, StudentStatus};
use serde::{Deserialize, Serialize};

/// Scalar aggregates describing one program's students.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramMetrics {
    pub student_count: usize,
    #[serde(rename = "averageGPA")]
    pub average_gpa: f64,
    pub attendance_rate: f64,
    pub completion_rate: f64,
    pub progress_rate: f64,
}

/// Present share of `records` as a percentage, `None` when there are no records.
pub fn attendance_rate<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let (present, total) = records
        .into_iter()
        .fold((0usize, 0usize), |(present, total), record| {
            (present + usize::from(record.is_present()), total + 1)
        });

    if total == 0 {
        None
    } else {
        Some(present as f64 / total as f64 * 100.0)
    }
}

/// Share of a student's goals marked completed; a student without goals contributes 0.
pub(crate) fn goal_completion_rate(student: &Student) -> f64 {
    let goals = &student.progress_tracking.goals;
    let completed = goals
        .iter()
        .filter(|goal| goal.status == Some(GoalStatus::Completed))
        .count();
    completed as f64 / goals.len().max(1) as f64 * 100.0
}

pub(crate) fn aggregate(program_id: &ProgramId, students: &[Student]) -> ProgramMetrics {
    let student_count = students.len();
    if student_count == 0 {
        return ProgramMetrics::default();
    }

    let mut total_gpa = 0.0;
    let mut total_attendance = 0.0;
    let mut completed_count = 0usize;
    let mut total_progress = 0.0;

    for student in students {
        total_gpa += student.overall_gpa().unwrap_or(0.0);
        total_attendance += attendance_rate(student.attendance_for(program_id)).unwrap_or(0.0);

        if student.academic_profile.status == StudentStatus::Graduated {
            completed_count += 1;
        }

        total_progress += goal_completion_rate(student);
    }

    let count = student_count as f64;
    ProgramMetrics {
        student_count,
        average_gpa: total_gpa / count,
        attendance_rate: total_attendance / count,
        completion_rate: completed_count as f64 / count * 100.0,
        progress_rate: total_progress / count,
    }
}
