//! Program-effectiveness analytics: metric aggregation, weighted scoring, threshold
//! recommendations, report assembly, and the student/program advisors.
//!
//! Every operation is a pure function of snapshots already loaded from the store.

mod advisor;
mod config;
mod dashboard;
mod metrics;
mod performance;
mod recommendations;
mod report;
mod scoring;

pub use advisor::AdvisoryRecommendation;
pub use config::{
    AnalyticsConfig, AnalyticsConfigError, AttendanceBands, EffectivenessWeights,
    PerformanceBands, RecommendationThresholds,
};
pub use dashboard::{
    DashboardSummary, OrganizationDashboard, PerformanceDistribution, ProgramMetricsEntry,
};
pub use metrics::{attendance_rate, ProgramMetrics};
pub use performance::{
    assessment_average, StudentPerformance, StudentProgramMetrics, StudentSummary,
};
pub use recommendations::{Priority, Recommendation, RecommendationKind};
pub use report::{
    Benchmarks, InvalidTimeframe, ProgramEffectiveness, ProgramReport, TimeSeriesData,
    TimeSeriesPoint, Timeframe,
};

use crate::domain::{Program, ProgramId, Student};
use tracing::debug;

/// Stateless analytics engine parameterised by an immutable [`AnalyticsConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProgramAnalytics {
    config: AnalyticsConfig,
}

impl ProgramAnalytics {
    pub fn new(config: AnalyticsConfig) -> Result<Self, AnalyticsConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Reduces the program's students into scalar metrics. Never fails; missing data counts as zero.
    pub fn aggregate(&self, program_id: &ProgramId, students: &[Student]) -> ProgramMetrics {
        metrics::aggregate(program_id, students)
    }

    pub fn score(&self, metrics: &ProgramMetrics) -> f64 {
        scoring::effectiveness_score(metrics, &self.config.weights)
    }

    pub fn recommend(&self, metrics: &ProgramMetrics, program: &Program) -> Vec<Recommendation> {
        let recommendations =
            recommendations::program_recommendations(metrics, &self.config.recommendations);
        debug!(
            program_id = %program.id,
            fired = recommendations.len(),
            "evaluated program recommendation rules"
        );
        recommendations
    }

    pub fn effectiveness(&self, program: &Program, students: &[Student]) -> ProgramEffectiveness {
        let metrics = self.aggregate(&program.id, students);
        let effectiveness_score = self.score(&metrics);
        let recommendations = self.recommend(&metrics, program);

        ProgramEffectiveness {
            metrics,
            effectiveness_score,
            recommendations,
        }
    }

    /// Assembles the performance report. Time-series and benchmark sections are placeholders.
    pub fn build_report(
        &self,
        program: &Program,
        students: &[Student],
        timeframe: Timeframe,
    ) -> ProgramReport {
        let effectiveness = self.effectiveness(program, students);
        debug!(
            program_id = %program.id,
            %timeframe,
            effectiveness_score = effectiveness.effectiveness_score,
            "assembled program report"
        );

        ProgramReport {
            program: program.name.clone(),
            time_series_data: report::time_series(&program.id, timeframe),
            benchmarks: report::benchmarks(&program.organization_id, &program.program_type),
            recommendations: effectiveness.recommendations,
        }
    }

    pub fn student_performance(
        &self,
        student: &Student,
        program_id: &ProgramId,
    ) -> StudentPerformance {
        performance::student_performance(student, program_id)
    }

    pub fn dashboard(&self, programs: &[Program], students: &[Student]) -> OrganizationDashboard {
        dashboard::organization_dashboard(programs, students, &self.config.performance)
    }

    pub fn program_entry(&self, program: &Program, students: &[Student]) -> ProgramMetricsEntry {
        ProgramMetricsEntry {
            program_id: program.id.clone(),
            name: program.name.clone(),
            program_type: program.program_type.clone(),
            metrics: self.effectiveness(program, students),
        }
    }

    pub fn student_recommendations(
        &self,
        student: &Student,
        program_id: Option<&ProgramId>,
    ) -> Vec<AdvisoryRecommendation> {
        advisor::student_recommendations(student, program_id, &self.config)
    }

    pub fn program_recommendations(
        &self,
        program: &Program,
        students: &[Student],
    ) -> Vec<AdvisoryRecommendation> {
        let metrics = self.aggregate(&program.id, students);
        let score = self.score(&metrics);
        advisor::program_recommendations(&metrics, score, &self.config)
    }
}
