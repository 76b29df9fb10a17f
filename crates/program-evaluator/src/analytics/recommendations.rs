use super::config::RecommendationThresholds;
use super::metrics::ProgramMetrics;
use serde::{Deserialize, Serialize};

/// Closed set of recommendation categories emitted by the program rules and the advisors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Improvement,
    Intervention,
    Resource,
    Adaptation,
    Engagement,
    Alert,
    ProgramImprovement,
}

impl RecommendationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Improvement => "Improvement",
            Self::Intervention => "Intervention",
            Self::Resource => "Resource",
            Self::Adaptation => "Adaptation",
            Self::Engagement => "Engagement",
            Self::Alert => "Alert",
            Self::ProgramImprovement => "Program Improvement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub description: String,
    pub priority: Priority,
}

impl Recommendation {
    fn new(kind: RecommendationKind, priority: Priority, description: &str) -> Self {
        Self {
            kind,
            description: description.to_string(),
            priority,
        }
    }
}

/// Evaluates every rule independently; output order follows rule order, not priority.
pub(crate) fn program_recommendations(
    metrics: &ProgramMetrics,
    thresholds: &RecommendationThresholds,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if metrics.average_gpa < thresholds.minimum_gpa {
        recommendations.push(Recommendation::new(
            RecommendationKind::Improvement,
            Priority::High,
            "Consider implementing additional academic support sessions to improve overall GPA",
        ));
    }

    if metrics.attendance_rate < thresholds.minimum_attendance_rate {
        recommendations.push(Recommendation::new(
            RecommendationKind::Intervention,
            Priority::Medium,
            "Attendance rates are below target. Consider implementing engagement strategies and attendance monitoring",
        ));
    }

    if metrics.progress_rate < thresholds.minimum_progress_rate {
        recommendations.push(Recommendation::new(
            RecommendationKind::Improvement,
            Priority::High,
            "Student progress rate indicates potential barriers. Review curriculum pacing and student support systems",
        ));
    }

    // Only the completion rule is guarded on enrolment; empty programs still trip rules 1-3.
    if metrics.student_count > 0 && metrics.completion_rate < thresholds.minimum_completion_rate {
        recommendations.push(Recommendation::new(
            RecommendationKind::Resource,
            Priority::High,
            "Low completion rates detected. Consider reviewing program structure and providing additional resources",
        ));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_metrics_produce_no_recommendations() {
        let metrics = ProgramMetrics {
            student_count: 1,
            average_gpa: 3.8,
            attendance_rate: 100.0,
            completion_rate: 100.0,
            progress_rate: 100.0,
        };
        assert!(program_recommendations(&metrics, &RecommendationThresholds::default()).is_empty());
    }

    #[test]
    fn empty_program_fires_first_three_rules_only() {
        let recommendations =
            program_recommendations(&ProgramMetrics::default(), &RecommendationThresholds::default());
        let kinds: Vec<_> = recommendations.iter().map(|rec| rec.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::Improvement,
                RecommendationKind::Intervention,
                RecommendationKind::Improvement,
            ]
        );
    }

    #[test]
    fn thresholds_are_strict_inequalities() {
        let metrics = ProgramMetrics {
            student_count: 4,
            average_gpa: 3.0,
            attendance_rate: 85.0,
            completion_rate: 75.0,
            progress_rate: 70.0,
        };
        assert!(program_recommendations(&metrics, &RecommendationThresholds::default()).is_empty());
    }

    #[test]
    fn serializes_with_type_key() {
        let rec = Recommendation::new(RecommendationKind::Resource, Priority::High, "x");
        let value = serde_json::to_value(&rec).expect("serializes");
        assert_eq!(value["type"], "resource");
        assert_eq!(value["priority"], "high");
    }
}
