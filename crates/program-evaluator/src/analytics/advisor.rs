use super::config::AnalyticsConfig;
use super::metrics::{attendance_rate, ProgramMetrics};
use super::recommendations::{Priority, RecommendationKind};
use crate::domain::{Assessment, AssessmentKind, AttendanceRecord, AttendanceStatus, ProgramId, Student};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recommendation with concrete follow-up actions for staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRecommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub description: String,
    pub specific_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GradeTrend {
    Improving,
    Stable,
    Declining,
}

/// Compares the mean of the later half of scored assessments against the earlier half.
pub(crate) fn grade_trend(assessments: &[&Assessment], margin: f64) -> GradeTrend {
    let mut dated: Vec<&&Assessment> = assessments.iter().collect();
    dated.sort_by_key(|assessment| (assessment.date.is_none(), assessment.date));

    let scores: Vec<f64> = dated
        .into_iter()
        .filter_map(|assessment| assessment.scored_percentage())
        .collect();
    if scores.len() < 2 {
        return GradeTrend::Stable;
    }

    let (earlier, later) = scores.split_at(scores.len() / 2);
    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
    let delta = mean(later) - mean(earlier);

    if delta < -margin {
        GradeTrend::Declining
    } else if delta > margin {
        GradeTrend::Improving
    } else {
        GradeTrend::Stable
    }
}

/// Mean percentage per assessment type, ignoring untyped or unscorable work.
pub(crate) fn performance_by_kind(assessments: &[&Assessment]) -> BTreeMap<AssessmentKind, f64> {
    let mut totals: BTreeMap<AssessmentKind, (f64, usize)> = BTreeMap::new();
    for assessment in assessments {
        if let (Some(kind), Some(pct)) = (assessment.kind, assessment.scored_percentage()) {
            let entry = totals.entry(kind).or_insert((0.0, 0));
            entry.0 += pct;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(kind, (sum, count))| (kind, sum / count as f64))
        .collect()
}

pub(crate) fn longest_absence_streak(records: &[&AttendanceRecord]) -> usize {
    let mut ordered: Vec<&&AttendanceRecord> = records.iter().collect();
    ordered.sort_by_key(|record| (record.date.is_none(), record.date));

    let mut longest = 0;
    let mut current = 0;
    for record in ordered {
        if record.status == Some(AttendanceStatus::Absent) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn learning_style_actions(style: &str) -> Vec<String> {
    let actions: &[&str] = match style.trim().to_ascii_lowercase().as_str() {
        "visual" => &[
            "Use diagrams, charts, and color-coded notes",
            "Provide video walkthroughs of key concepts",
            "Encourage mind maps when reviewing material",
        ],
        "auditory" => &[
            "Offer recorded lectures and discussion-based review",
            "Encourage reading notes aloud",
            "Pair with study partners for verbal explanation",
        ],
        "kinesthetic" | "tactile" => &[
            "Incorporate hands-on activities and manipulatives",
            "Break study sessions into short active intervals",
            "Use role-play or lab work to reinforce concepts",
        ],
        "reading/writing" | "reading-writing" | "read/write" | "reading" => &[
            "Provide written summaries and handouts",
            "Assign reflective journaling after lessons",
            "Encourage rewriting notes in their own words",
        ],
        _ => &[
            "Discuss preferred study approaches with the student",
            "Offer course materials in several formats",
        ],
    };
    actions.iter().map(|action| action.to_string()).collect()
}

fn interest_actions(interests: &[String]) -> Vec<String> {
    interests
        .iter()
        .filter(|interest| !interest.trim().is_empty())
        .map(|interest| format!("Connect coursework to the student's interest in {}", interest.trim()))
        .collect()
}

pub(crate) fn student_recommendations(
    student: &Student,
    program_id: Option<&ProgramId>,
    config: &AnalyticsConfig,
) -> Vec<AdvisoryRecommendation> {
    let assessments: Vec<&Assessment> = match program_id {
        Some(id) => student.assessments_for(id).collect(),
        None => student.assessments.iter().collect(),
    };
    let attendance: Vec<&AttendanceRecord> = match program_id {
        Some(id) => student.attendance_for(id).collect(),
        None => student.attendance.iter().collect(),
    };

    let mut insights = Vec::new();

    if grade_trend(&assessments, config.decline_margin) == GradeTrend::Declining {
        insights.push(AdvisoryRecommendation {
            kind: RecommendationKind::Intervention,
            priority: Priority::High,
            description:
                "Grade performance showing declining trend. Consider immediate academic support."
                    .to_string(),
            specific_actions: vec![
                "Schedule one-on-one tutoring sessions".to_string(),
                "Review study techniques and materials".to_string(),
                "Assess potential learning barriers".to_string(),
            ],
        });
    }

    for (kind, percentage) in performance_by_kind(&assessments) {
        let grade_points = percentage / 25.0;
        if grade_points < config.performance.average {
            let subject = kind.label();
            insights.push(AdvisoryRecommendation {
                kind: RecommendationKind::Improvement,
                priority: Priority::Medium,
                description: format!(
                    "Below average performance in {subject} assessments. Consider targeted support."
                ),
                specific_actions: vec![
                    format!("Provide additional {subject} practice materials"),
                    format!("Review {subject} feedback with a specialist teacher"),
                    "Consider peer study groups".to_string(),
                ],
            });
        }
    }

    if let Some(rate) = attendance_rate(attendance.iter().copied()) {
        if rate < config.attendance.poor {
            insights.push(AdvisoryRecommendation {
                kind: RecommendationKind::Intervention,
                priority: Priority::High,
                description: format!(
                    "Critical attendance issues detected ({rate:.0}% present). Immediate intervention recommended."
                ),
                specific_actions: vec![
                    "Schedule parent-teacher conference".to_string(),
                    "Develop attendance improvement plan".to_string(),
                    "Consider underlying causes (transportation, health, etc.)".to_string(),
                ],
            });
        }
    }

    let streak = longest_absence_streak(&attendance);
    if streak > 2 {
        insights.push(AdvisoryRecommendation {
            kind: RecommendationKind::Alert,
            priority: Priority::High,
            description: format!(
                "{streak} consecutive absences detected. Risk of falling behind."
            ),
            specific_actions: vec![
                "Contact student/parents immediately".to_string(),
                "Provide missed work compilation".to_string(),
                "Schedule catch-up sessions".to_string(),
            ],
        });
    }

    let profile = &student.learning_profile;
    if let Some(style) = profile
        .learning_style
        .as_deref()
        .filter(|style| !style.trim().is_empty())
    {
        insights.push(AdvisoryRecommendation {
            kind: RecommendationKind::Adaptation,
            priority: Priority::Medium,
            description: format!(
                "Consider adapting teaching methods to {} learning style",
                style.trim()
            ),
            specific_actions: learning_style_actions(style),
        });
    }

    let interests = interest_actions(&profile.interests);
    if !interests.is_empty() {
        insights.push(AdvisoryRecommendation {
            kind: RecommendationKind::Engagement,
            priority: Priority::Medium,
            description: "Opportunity to increase engagement through personal interests".to_string(),
            specific_actions: interests,
        });
    }

    insights
}

pub(crate) fn program_recommendations(
    metrics: &ProgramMetrics,
    effectiveness_score: f64,
    config: &AnalyticsConfig,
) -> Vec<AdvisoryRecommendation> {
    if effectiveness_score >= config.effectiveness_target {
        return Vec::new();
    }

    let thresholds = &config.recommendations;
    let mut actions = Vec::new();
    if metrics.average_gpa < thresholds.minimum_gpa {
        actions.push(format!(
            "Strengthen academic support to lift average GPA above {:.1}",
            thresholds.minimum_gpa
        ));
    }
    if metrics.attendance_rate < thresholds.minimum_attendance_rate {
        actions.push(format!(
            "Introduce attendance monitoring to reach {:.0}% attendance",
            thresholds.minimum_attendance_rate
        ));
    }
    if metrics.progress_rate < thresholds.minimum_progress_rate {
        actions.push(format!(
            "Review curriculum pacing so goal progress reaches {:.0}%",
            thresholds.minimum_progress_rate
        ));
    }
    if metrics.student_count > 0 && metrics.completion_rate < thresholds.minimum_completion_rate {
        actions.push(format!(
            "Review program structure to raise completion above {:.0}%",
            thresholds.minimum_completion_rate
        ));
    }

    vec![AdvisoryRecommendation {
        kind: RecommendationKind::ProgramImprovement,
        priority: Priority::High,
        description: format!(
            "Program effectiveness {:.1} is below the target of {:.0}. Review and adjust program components.",
            effectiveness_score, config.effectiveness_target
        ),
        specific_actions: actions,
    }]
}
