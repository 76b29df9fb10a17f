use super::{OrganizationId, ProgramId, StudentId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
    Withdrawn,
}

impl StudentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Graduated => "graduated",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "graduated" => Some(Self::Graduated),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Exam,
    Project,
    Assignment,
    Participation,
    Other,
}

impl AssessmentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::Project => "project",
            Self::Assignment => "assignment",
            Self::Participation => "participation",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Completed,
    Delayed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    /// Institution-assigned student number, unique per organization.
    pub student_id: String,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceMetrics {
    #[serde(rename = "overallGPA")]
    pub overall_gpa: Option<f64>,
    pub attendance_rate: Option<f64>,
    pub participation_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AcademicProfile {
    pub enrollment_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub status: StudentStatus,
    pub performance_metrics: PerformanceMetrics,
}

/// Graded work for one (student, program) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Assessment {
    pub program_id: Option<ProgramId>,
    #[serde(rename = "type")]
    pub kind: Option<AssessmentKind>,
    pub name: Option<String>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub date: Option<NaiveDate>,
    pub feedback: Option<String>,
}

impl Assessment {
    /// `score / maxScore * 100`, or `None` when either side is missing or the maximum is zero.
    pub fn scored_percentage(&self) -> Option<f64> {
        match (self.score, self.max_score) {
            (Some(score), Some(max)) if max != 0.0 && max.is_finite() && score.is_finite() => {
                Some(score / max * 100.0)
            }
            _ => None,
        }
    }

    /// Percentage with unscorable assessments contributing zero.
    pub fn percentage(&self) -> f64 {
        self.scored_percentage().unwrap_or(0.0)
    }

    pub fn belongs_to(&self, program_id: &ProgramId) -> bool {
        self.program_id.as_ref() == Some(program_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub program_id: Option<ProgramId>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

impl AttendanceRecord {
    pub fn belongs_to(&self, program_id: &ProgramId) -> bool {
        self.program_id.as_ref() == Some(program_id)
    }

    pub fn is_present(&self) -> bool {
        self.status == Some(AttendanceStatus::Present)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Goal {
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub status: Option<GoalStatus>,
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Milestone {
    pub name: Option<String>,
    pub achieved_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressTracking {
    pub goals: Vec<Goal>,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearningProfile {
    pub strengths: Vec<String>,
    pub challenges: Vec<String>,
    pub learning_style: Option<String>,
    pub accommodations: Vec<String>,
    pub interests: Vec<String>,
}

/// Student document as materialized from the store. Every nested field defaults so
/// partially populated documents still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub organization_id: OrganizationId,
    pub program_ids: Vec<ProgramId>,
    pub personal_info: PersonalInfo,
    pub academic_profile: AcademicProfile,
    pub assessments: Vec<Assessment>,
    pub attendance: Vec<AttendanceRecord>,
    pub learning_profile: LearningProfile,
    pub progress_tracking: ProgressTracking,
}

impl Student {
    pub fn is_enrolled_in(&self, program_id: &ProgramId) -> bool {
        self.program_ids.contains(program_id)
    }

    pub fn enroll(&mut self, program_id: &ProgramId) {
        if !self.is_enrolled_in(program_id) {
            self.program_ids.push(program_id.clone());
        }
    }

    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.personal_info.first_name, self.personal_info.last_name
        )
    }

    pub fn overall_gpa(&self) -> Option<f64> {
        self.academic_profile.performance_metrics.overall_gpa
    }

    pub fn assessments_for<'a>(
        &'a self,
        program_id: &'a ProgramId,
    ) -> impl Iterator<Item = &'a Assessment> + 'a {
        self.assessments
            .iter()
            .filter(move |assessment| assessment.belongs_to(program_id))
    }

    pub fn attendance_for<'a>(
        &'a self,
        program_id: &'a ProgramId,
    ) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
        self.attendance
            .iter()
            .filter(move |record| record.belongs_to(program_id))
    }
}
