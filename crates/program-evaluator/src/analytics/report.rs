use super::metrics::ProgramMetrics;
use super::recommendations::Recommendation;
use crate::domain::{OrganizationId, ProgramId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Look-back window requested for a performance report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
}

impl Timeframe {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1month",
            Self::ThreeMonths => "3months",
            Self::SixMonths => "6months",
            Self::OneYear => "1year",
        }
    }

    pub const fn months(self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::OneYear => 12,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported timeframe '{0}' (expected 1month, 3months, 6months, or 1year)")]
pub struct InvalidTimeframe(pub String);

impl FromStr for Timeframe {
    type Err = InvalidTimeframe;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1month" => Ok(Self::OneMonth),
            "3months" => Ok(Self::ThreeMonths),
            "6months" => Ok(Self::SixMonths),
            "1year" | "12months" => Ok(Self::OneYear),
            _ => Err(InvalidTimeframe(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub period_start: NaiveDate,
    pub metrics: ProgramMetrics,
}

/// Historical series for a program. Not populated yet; callers must tolerate empty members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesData {
    pub current: BTreeMap<String, f64>,
    pub historical: Vec<TimeSeriesPoint>,
    pub trends: BTreeMap<String, f64>,
}

/// Comparative figures against peer programs. Not populated yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benchmarks {
    pub organization_average: BTreeMap<String, f64>,
    pub similar_programs_average: BTreeMap<String, f64>,
    pub top_performer_metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramReport {
    pub program: String,
    pub time_series_data: TimeSeriesData,
    pub benchmarks: Benchmarks,
    pub recommendations: Vec<Recommendation>,
}

/// Aggregated metrics merged with the effectiveness score and rule output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramEffectiveness {
    #[serde(flatten)]
    pub metrics: ProgramMetrics,
    pub effectiveness_score: f64,
    pub recommendations: Vec<Recommendation>,
}

pub(crate) fn time_series(_program_id: &ProgramId, _timeframe: Timeframe) -> TimeSeriesData {
    TimeSeriesData::default()
}

pub(crate) fn benchmarks(_organization_id: &OrganizationId, _program_type: &str) -> Benchmarks {
    Benchmarks::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_parses_known_windows() {
        assert_eq!("6months".parse::<Timeframe>(), Ok(Timeframe::SixMonths));
        assert_eq!(" 1YEAR ".parse::<Timeframe>(), Ok(Timeframe::OneYear));
        assert_eq!(Timeframe::default(), Timeframe::SixMonths);
        assert!("fortnight".parse::<Timeframe>().is_err());
    }

    #[test]
    fn stubs_serialize_as_empty_structures() {
        let value = serde_json::to_value(TimeSeriesData::default()).expect("serializes");
        assert_eq!(
            value,
            serde_json::json!({ "current": {}, "historical": [], "trends": {} })
        );

        let value = serde_json::to_value(Benchmarks::default()).expect("serializes");
        assert_eq!(
            value,
            serde_json::json!({
                "organizationAverage": {},
                "similarProgramsAverage": {},
                "topPerformerMetrics": {}
            })
        );
    }
}
