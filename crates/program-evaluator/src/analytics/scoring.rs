use super::config::EffectivenessWeights;
use super::metrics::ProgramMetrics;

/// Weighted effectiveness score on the 0-100 scale of its inputs. The result is not clamped,
/// so out-of-range inputs surface as out-of-range scores.
pub(crate) fn effectiveness_score(metrics: &ProgramMetrics, weights: &EffectivenessWeights) -> f64 {
    let normalized_gpa = metrics.average_gpa / weights.gpa_scale() * 100.0;

    metrics.completion_rate * weights.completion_rate()
        + normalized_gpa * weights.average_gpa()
        + metrics.attendance_rate * weights.attendance_rate()
        + metrics.progress_rate * weights.progress_rate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> ProgramMetrics {
        ProgramMetrics {
            student_count: 12,
            average_gpa: 3.2,
            attendance_rate: 88.0,
            completion_rate: 60.0,
            progress_rate: 72.5,
        }
    }

    #[test]
    fn doubling_one_input_adds_exactly_its_weighted_term() {
        let weights = EffectivenessWeights::standard();
        let base = metrics();
        let baseline = effectiveness_score(&base, &weights);

        let doubled = ProgramMetrics {
            attendance_rate: base.attendance_rate * 2.0,
            ..base
        };
        let delta = effectiveness_score(&doubled, &weights) - baseline;
        assert!((delta - base.attendance_rate * 0.20).abs() < 1e-9);

        let doubled = ProgramMetrics {
            average_gpa: base.average_gpa * 2.0,
            ..base
        };
        let delta = effectiveness_score(&doubled, &weights) - baseline;
        assert!((delta - base.average_gpa / 4.0 * 100.0 * 0.25).abs() < 1e-9);
    }

    #[test]
    fn score_is_not_clamped() {
        let weights = EffectivenessWeights::standard();
        let inflated = ProgramMetrics {
            student_count: 1,
            average_gpa: 8.0,
            attendance_rate: 150.0,
            completion_rate: 100.0,
            progress_rate: 100.0,
        };
        assert!(effectiveness_score(&inflated, &weights) > 100.0);
    }

    #[test]
    fn alternate_weights_change_the_score() {
        let weights = EffectivenessWeights::new(1.0, 0.0, 0.0, 0.0).expect("valid weights");
        assert!((effectiveness_score(&metrics(), &weights) - 60.0).abs() < 1e-9);
    }
}
