use crate::bucketer::{has_nonzero, Bucketer, GraphPeriod, PeriodBucket};
use crate::calendar::{period_window, Window};
use crate::config::{AnalyticsConfig, PieOrder};
use crate::error::Result;
use crate::merge::merge_all;
use crate::schema::MonetaryRecord;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The current week, month, quarter and year windows relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindows {
    pub week: Window,
    pub month: Window,
    pub quarter: Window,
    pub year: Window,
}

impl ReportingWindows {
    pub fn at(now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            week: period_window(GraphPeriod::Week.period(), now)?,
            month: period_window(GraphPeriod::Month.period(), now)?,
            quarter: period_window(GraphPeriod::Quarter.period(), now)?,
            year: period_window(GraphPeriod::Year.period(), now)?,
        })
    }

    pub fn get(&self, period: GraphPeriod) -> Window {
        match period {
            GraphPeriod::Week => self.week,
            GraphPeriod::Month => self.month,
            GraphPeriod::Quarter => self.quarter,
            GraphPeriod::Year => self.year,
        }
    }
}

/// The record sources fetched for one reporting window. Sources are merged in order.
#[derive(Debug, Clone)]
pub struct PeriodRecords {
    pub window: Window,
    pub sources: Vec<Vec<MonetaryRecord>>,
}

impl PeriodRecords {
    pub fn records(&self) -> impl Iterator<Item = &MonetaryRecord> {
        self.sources.iter().flatten()
    }
}

#[derive(Debug, Clone)]
pub struct ReportingRecords {
    pub week: PeriodRecords,
    pub month: PeriodRecords,
    pub quarter: PeriodRecords,
    pub year: PeriodRecords,
}

impl ReportingRecords {
    pub fn get(&self, period: GraphPeriod) -> &PeriodRecords {
        match period {
            GraphPeriod::Week => &self.week,
            GraphPeriod::Month => &self.month,
            GraphPeriod::Quarter => &self.quarter,
            GraphPeriod::Year => &self.year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    pub week: Vec<PeriodBucket>,
    pub month: Vec<PeriodBucket>,
    pub quarter: Vec<PeriodBucket>,
    pub year: Vec<PeriodBucket>,
    #[schemars(description = "First of week, month, quarter, year with a nonzero bucket; null when all are zero")]
    pub default_dataset: Option<GraphPeriod>,
}

impl GraphData {
    pub fn series(&self, period: GraphPeriod) -> &[PeriodBucket] {
        match period {
            GraphPeriod::Week => &self.week,
            GraphPeriod::Month => &self.month,
            GraphPeriod::Quarter => &self.quarter,
            GraphPeriod::Year => &self.year,
        }
    }
}

/// One slice of a pie dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryBreakdown {
    pub label: String,
    pub value: Decimal,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PieData {
    pub month: Vec<CategoryBreakdown>,
    pub quarter: Vec<CategoryBreakdown>,
    pub year: Vec<CategoryBreakdown>,
    pub default_dataset: Option<GraphPeriod>,
}

/// Picks the first series, in week → month → quarter → year order, that has a
/// nonzero bucket. Empty and all-zero series are treated alike.
pub fn select_default_dataset(
    week: &[PeriodBucket],
    month: &[PeriodBucket],
    quarter: &[PeriodBucket],
    year: &[PeriodBucket],
) -> Option<GraphPeriod> {
    let candidates = [
        (GraphPeriod::Week, week),
        (GraphPeriod::Month, month),
        (GraphPeriod::Quarter, quarter),
        (GraphPeriod::Year, year),
    ];
    candidates
        .into_iter()
        .find(|(_, series)| has_nonzero(*series))
        .map(|(period, _)| period)
}

fn select_default_pie(
    month: &[CategoryBreakdown],
    quarter: &[CategoryBreakdown],
    year: &[CategoryBreakdown],
) -> Option<GraphPeriod> {
    let nonzero = |slices: &[CategoryBreakdown]| slices.iter().any(|s| !s.value.is_zero());
    [
        (GraphPeriod::Month, month),
        (GraphPeriod::Quarter, quarter),
        (GraphPeriod::Year, year),
    ]
    .into_iter()
    .find(|(_, slices)| nonzero(*slices))
    .map(|(period, _)| period)
}

pub struct DatasetBuilder {
    bucketer: Bucketer,
    pie_order: PieOrder,
}

impl DatasetBuilder {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            bucketer: Bucketer::new(config.day_labels),
            pie_order: config.pie_order,
        }
    }

    pub fn bucketer(&self) -> &Bucketer {
        &self.bucketer
    }

    /// Buckets each source separately and merges them into one dense series.
    pub fn series(&self, period: GraphPeriod, records: &PeriodRecords) -> Result<Vec<PeriodBucket>> {
        if records.sources.is_empty() {
            let expected = self.bucketer.expected_labels(period, &records.window)?;
            return Ok(expected.into_iter().map(PeriodBucket::empty).collect());
        }

        let bucketed = records
            .sources
            .iter()
            .map(|source| self.bucketer.bucket(period, &records.window, source))
            .collect::<Result<Vec<_>>>()?;

        let merged = merge_all(bucketed);
        debug!(
            "Built {:?} series with {} buckets from {} sources",
            period,
            merged.len(),
            records.sources.len()
        );
        Ok(merged)
    }

    /// All four series. A failure in any one of them fails the whole dataset.
    pub fn graph_data(&self, records: &ReportingRecords) -> Result<GraphData> {
        let week = self.series(GraphPeriod::Week, &records.week)?;
        let month = self.series(GraphPeriod::Month, &records.month)?;
        let quarter = self.series(GraphPeriod::Quarter, &records.quarter)?;
        let year = self.series(GraphPeriod::Year, &records.year)?;
        let default_dataset = select_default_dataset(&week, &month, &quarter, &year);

        Ok(GraphData {
            week,
            month,
            quarter,
            year,
            default_dataset,
        })
    }

    /// Per-category sums and record counts over every source in the window.
    pub fn pie_breakdown(&self, records: &PeriodRecords) -> Vec<CategoryBreakdown> {
        let mut ordered: Vec<&MonetaryRecord> = records
            .records()
            .filter(|record| records.window.contains(record.occurred_at))
            .collect();
        ordered.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then_with(|| a.id.cmp(&b.id)));

        let mut slices: Vec<CategoryBreakdown> = Vec::new();
        for record in ordered {
            match slices.iter_mut().find(|s| s.label == record.category) {
                Some(slice) => {
                    slice.value += record.amount;
                    slice.count += 1;
                }
                None => slices.push(CategoryBreakdown {
                    label: record.category.clone(),
                    value: record.amount,
                    count: 1,
                }),
            }
        }

        if self.pie_order == PieOrder::ValueDesc {
            slices.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        }
        slices
    }

    pub fn pie_data(&self, records: &ReportingRecords) -> PieData {
        let month = self.pie_breakdown(&records.month);
        let quarter = self.pie_breakdown(&records.quarter);
        let year = self.pie_breakdown(&records.year);
        let default_dataset = select_default_pie(&month, &quarter, &year);

        PieData {
            month,
            quarter,
            year,
            default_dataset,
        }
    }
}
