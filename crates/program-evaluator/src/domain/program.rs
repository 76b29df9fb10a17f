use super::{OrganizationId, ProgramId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a program. Programs are archived rather than deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl ProgramStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Archived => "archived",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Persisted outcome snapshot. Written back by callers after scoring, never by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgramMetricsSnapshot {
    pub effectiveness_score: Option<f64>,
    pub student_satisfaction: Option<f64>,
    pub average_performance: Option<f64>,
    pub completion_rate: Option<f64>,
}

impl ProgramMetricsSnapshot {
    /// Checks each populated field against its documented range.
    pub fn validate(&self) -> Result<(), String> {
        let checks = [
            ("effectivenessScore", self.effectiveness_score, 100.0),
            ("studentSatisfaction", self.student_satisfaction, 5.0),
            ("averagePerformance", self.average_performance, 100.0),
            ("completionRate", self.completion_rate, 100.0),
        ];

        for (field, value, max) in checks {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 || value > max {
                    return Err(format!("metrics.{field} must be between 0 and {max}"));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetric {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub calculation_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCriterion {
    pub name: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub minimum_score: Option<f64>,
}

/// A course or curriculum offering tracked for effectiveness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: ProgramId,
    pub organization_id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub program_type: String,
    #[serde(default)]
    pub status: ProgramStatus,
    #[serde(default)]
    pub metrics: ProgramMetricsSnapshot,
    #[serde(default)]
    pub custom_metrics: Vec<CustomMetric>,
    #[serde(default)]
    pub assessment_criteria: Vec<AssessmentCriterion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
