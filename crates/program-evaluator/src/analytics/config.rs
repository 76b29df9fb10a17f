use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Fixed weights feeding the effectiveness score. The four rate weights must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivenessWeights {
    completion_rate: f64,
    #[serde(rename = "averageGPA")]
    average_gpa: f64,
    attendance_rate: f64,
    progress_rate: f64,
    #[serde(default = "default_gpa_scale")]
    gpa_scale: f64,
}

fn default_gpa_scale() -> f64 {
    4.0
}

impl EffectivenessWeights {
    pub fn new(
        completion_rate: f64,
        average_gpa: f64,
        attendance_rate: f64,
        progress_rate: f64,
    ) -> Result<Self, AnalyticsConfigError> {
        let weights = Self {
            completion_rate,
            average_gpa,
            attendance_rate,
            progress_rate,
            gpa_scale: default_gpa_scale(),
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn standard() -> Self {
        Self {
            completion_rate: 0.30,
            average_gpa: 0.25,
            attendance_rate: 0.20,
            progress_rate: 0.25,
            gpa_scale: default_gpa_scale(),
        }
    }

    pub fn with_gpa_scale(mut self, gpa_scale: f64) -> Result<Self, AnalyticsConfigError> {
        self.gpa_scale = gpa_scale;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), AnalyticsConfigError> {
        let parts = [
            self.completion_rate,
            self.average_gpa,
            self.attendance_rate,
            self.progress_rate,
        ];
        if parts.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
            return Err(AnalyticsConfigError::NegativeWeight);
        }

        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AnalyticsConfigError::WeightSum { sum });
        }

        if !self.gpa_scale.is_finite() || self.gpa_scale <= 0.0 {
            return Err(AnalyticsConfigError::GpaScale(self.gpa_scale));
        }

        Ok(())
    }

    pub fn completion_rate(&self) -> f64 {
        self.completion_rate
    }

    pub fn average_gpa(&self) -> f64 {
        self.average_gpa
    }

    pub fn attendance_rate(&self) -> f64 {
        self.attendance_rate
    }

    pub fn progress_rate(&self) -> f64 {
        self.progress_rate
    }

    pub fn gpa_scale(&self) -> f64 {
        self.gpa_scale
    }
}

impl Default for EffectivenessWeights {
    fn default() -> Self {
        Self::standard()
    }
}

/// Cut-offs below which a program-level recommendation fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommendationThresholds {
    #[serde(rename = "minimumGPA")]
    pub minimum_gpa: f64,
    pub minimum_attendance_rate: f64,
    pub minimum_progress_rate: f64,
    pub minimum_completion_rate: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            minimum_gpa: 3.0,
            minimum_attendance_rate: 85.0,
            minimum_progress_rate: 70.0,
            minimum_completion_rate: 75.0,
        }
    }
}

/// GPA bands used by the dashboard distribution and the student advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceBands {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
}

impl Default for PerformanceBands {
    fn default() -> Self {
        Self {
            excellent: 3.5,
            good: 3.0,
            average: 2.0,
        }
    }
}

/// Attendance percentage bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttendanceBands {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub poor: f64,
}

impl Default for AttendanceBands {
    fn default() -> Self {
        Self {
            excellent: 95.0,
            good: 90.0,
            average: 85.0,
            poor: 80.0,
        }
    }
}

/// Immutable tuning handed to [`super::ProgramAnalytics`] at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsConfig {
    pub weights: EffectivenessWeights,
    pub recommendations: RecommendationThresholds,
    pub performance: PerformanceBands,
    pub attendance: AttendanceBands,
    pub effectiveness_target: f64,
    /// Percentage-point drop between earlier and later assessments that counts as declining.
    pub decline_margin: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            weights: EffectivenessWeights::standard(),
            recommendations: RecommendationThresholds::default(),
            performance: PerformanceBands::default(),
            attendance: AttendanceBands::default(),
            effectiveness_target: 70.0,
            decline_margin: 5.0,
        }
    }
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<(), AnalyticsConfigError> {
        self.weights.validate()?;
        if !self.decline_margin.is_finite() || self.decline_margin < 0.0 {
            return Err(AnalyticsConfigError::DeclineMargin(self.decline_margin));
        }
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AnalyticsConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AnalyticsConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsConfigError {
    #[error("effectiveness weights must sum to 1.0 (found {sum})")]
    WeightSum { sum: f64 },
    #[error("effectiveness weights must be finite and non-negative")]
    NegativeWeight,
    #[error("GPA scale must be positive (found {0})")]
    GpaScale(f64),
    #[error("decline margin must be non-negative (found {0})")]
    DeclineMargin(f64),
    #[error("failed to read analytics config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid analytics config: {0}")]
    Json(#[from] serde_json::Error),
}
