use crate::domain::{Program, ProgramStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgramQuery {
    /// Minimum stored effectiveness score.
    pub effectiveness: Option<f64>,
    #[serde(rename = "type")]
    pub program_type: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Type,
    Status,
    CreatedAt,
    EffectivenessScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "name" => SortField::Name,
            "type" => SortField::Type,
            "status" => SortField::Status,
            "createdAt" => SortField::CreatedAt,
            "effectivenessScore" | "metrics.effectivenessScore" => SortField::EffectivenessScore,
            other => return Err(format!("unsupported sort field '{other}'")),
        };
        Ok(Self { field, descending })
    }

    fn compare(&self, left: &Program, right: &Program) -> Ordering {
        let ordering = match self.field {
            SortField::Name => left.name.cmp(&right.name),
            SortField::Type => left.program_type.cmp(&right.program_type),
            SortField::Status => left.status.label().cmp(right.status.label()),
            SortField::CreatedAt => left.created_at.cmp(&right.created_at),
            SortField::EffectivenessScore => left
                .metrics
                .effectiveness_score
                .partial_cmp(&right.metrics.effectiveness_score)
                .unwrap_or(Ordering::Equal),
        };
        let ordering = if self.descending {
            ordering.reverse()
        } else {
            ordering
        };
        ordering.then_with(|| left.id.cmp(&right.id))
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            descending: false,
        }
    }
}

/// One page of results in the shape the listing endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total_docs: usize,
    pub limit: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl ProgramQuery {
    /// Filters, sorts, and slices `programs`. Rejects unknown statuses and sort fields, and a zero page or limit.
    pub fn apply(&self, mut programs: Vec<Program>) -> Result<Page<Program>, String> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                ProgramStatus::parse(raw).ok_or_else(|| format!("unsupported status '{raw}'"))?,
            ),
        };
        let order = match self.sort.as_deref().map(str::trim) {
            None | Some("") => SortOrder::default(),
            Some(raw) => SortOrder::parse(raw)?,
        };
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err("page must be at least 1".to_string());
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 {
            return Err("limit must be at least 1".to_string());
        }
        let limit = limit.min(MAX_PAGE_SIZE);

        programs.retain(|program| {
            if let Some(minimum) = self.effectiveness {
                match program.metrics.effectiveness_score {
                    Some(score) if score >= minimum => {}
                    _ => return false,
                }
            }
            if let Some(program_type) = self.program_type.as_deref() {
                if !program_type.is_empty() && program.program_type != program_type {
                    return false;
                }
            }
            status.map_or(true, |status| program.status == status)
        });
        programs.sort_by(|left, right| order.compare(left, right));

        let total_docs = programs.len();
        let total_pages = total_docs.div_ceil(limit).max(1);
        let docs = programs
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(Page {
            docs,
            total_docs,
            limit,
            page,
            total_pages,
        })
    }
}
