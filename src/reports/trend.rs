//! Trend Report
//!
//! Monthly series for one label plus summary statistics over the individual
//! transactions that fed it.

use crate::engine::{Engine, MonthlyAmount};
use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{DateRange, LabelId, LabelType, Money, YearMonth};

/// Summary statistics over per-transaction contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendStats {
    pub count: usize,
    pub total: Money,
    /// Upper-middle element of the sorted amounts
    pub median: Money,
    pub min: Money,
    pub max: Money,
}

impl TrendStats {
    /// Compute stats, or `None` when there are no amounts
    pub fn from_amounts(amounts: &[Money]) -> Option<Self> {
        let mut sorted = amounts.to_vec();
        sorted.sort();

        let min = *sorted.first()?;
        let max = *sorted.last()?;
        Some(Self {
            count: sorted.len(),
            total: sorted.iter().sum(),
            median: sorted[sorted.len() / 2],
            min,
            max,
        })
    }
}

/// Trend Report
#[derive(Debug, Clone)]
pub struct TrendReport {
    pub label_id: LabelId,
    pub label_name: String,
    pub label_type: LabelType,
    /// Covered range; `None` when the label has no activity and no range was given
    pub range: Option<DateRange>,
    /// One entry per month, ascending, zeros included
    pub series: Vec<MonthlyAmount>,
    pub stats: Option<TrendStats>,
}

impl TrendReport {
    /// Generate a trend for a label
    ///
    /// Without a range, the series runs from the first to the last month in
    /// which the label has activity.
    pub fn generate(
        engine: &Engine,
        label_id: LabelId,
        range: Option<DateRange>,
    ) -> LabelbookResult<Self> {
        let label = engine
            .label(label_id)
            .ok_or_else(|| LabelbookError::label_not_found(label_id.to_string()))?;

        let contributions: Vec<_> = engine
            .contributions(label_id)?
            .into_iter()
            .filter(|c| range.map_or(true, |r| r.contains(c.date)))
            .collect();

        let range = match range {
            Some(range) => Some(range),
            None => match (contributions.first(), contributions.last()) {
                (Some(first), Some(last)) => Some(
                    DateRange::months(
                        YearMonth::from_date(first.date),
                        YearMonth::from_date(last.date),
                    )
                    .map_err(|e| LabelbookError::Validation(e.to_string()))?,
                ),
                _ => None,
            },
        };

        let series = match range {
            Some(range) => engine.aggregate(label_id, range)?,
            None => Vec::new(),
        };

        let amounts: Vec<Money> = contributions.iter().map(|c| c.amount).collect();

        Ok(Self {
            label_id,
            label_name: label.name.clone(),
            label_type: label.label_type,
            range,
            series,
            stats: TrendStats::from_amounts(&amounts),
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Trend: {} ({})\n",
            self.label_name, self.label_type
        ));
        if let Some(range) = &self.range {
            output.push_str(&format!("Period: {}\n", range));
        }
        output.push_str(&"=".repeat(60));
        output.push('\n');

        let Some(stats) = &self.stats else {
            output.push_str("No transactions found.\n");
            return output;
        };

        output.push_str(&format!("{:>8}: {}\n", "Total", stats.total));
        output.push_str(&format!("{:>8}: {}\n", "Median", stats.median));
        output.push_str(&format!("{:>8}: {}\n", "Min", stats.min));
        output.push_str(&format!("{:>8}: {}\n", "Max", stats.max));
        output.push_str(&format!("{:>8}: {}\n\n", "Count", stats.count));

        let peak = self
            .series
            .iter()
            .map(|m| m.amount.cents())
            .max()
            .unwrap_or(0);

        for month in &self.series {
            let width = if peak > 0 && month.amount.is_positive() {
                ((month.amount.cents() * 30) / peak).max(1) as usize
            } else {
                0
            };
            output.push_str(&format!(
                "{:<8} {:>12} {}\n",
                month.period.start_date().format("%b %Y").to_string(),
                month.amount,
                "#".repeat(width)
            ));
        }

        output
    }
}
