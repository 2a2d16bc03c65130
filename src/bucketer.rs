use crate::calendar::{
    add_months, first_of_month, iso_week_span, midnight, month_abbreviation,
    week_of_month_offset, weekday_name, Period, Window, WEEK_DAYS,
};
use crate::config::DayLabelStyle;
use crate::error::Result;
use crate::schema::MonetaryRecord;
use chrono::{DateTime, Datelike, Utc, Weekday};
use log::debug;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four reporting windows a dashboard graphs, in default-selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GraphPeriod {
    #[schemars(description = "Current Sunday-start week, one bucket per day")]
    Week,
    #[schemars(description = "Current month, one 'Week N' bucket per ISO week touched")]
    Month,
    #[schemars(description = "Current calendar quarter, one bucket per month")]
    Quarter,
    #[schemars(description = "Current calendar year, one bucket per month")]
    Year,
}

impl GraphPeriod {
    pub const ALL: [GraphPeriod; 4] = [
        GraphPeriod::Week,
        GraphPeriod::Month,
        GraphPeriod::Quarter,
        GraphPeriod::Year,
    ];

    pub fn period(self) -> Period {
        match self {
            GraphPeriod::Week => Period::Week,
            GraphPeriod::Month => Period::Month,
            GraphPeriod::Quarter => Period::Quarter,
            GraphPeriod::Year => Period::Year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryTotal {
    #[serde(rename = "type")]
    pub category: String,
    pub total: Decimal,
}

/// One point of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodBucket {
    pub label: String,
    pub total: Decimal,
    #[serde(default)]
    pub categories: Vec<CategoryTotal>,
}

impl PeriodBucket {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            total: Decimal::ZERO,
            categories: Vec::new(),
        }
    }

    /// Adds an amount under `category`, keeping categories in first-seen order.
    pub fn add(&mut self, category: &str, amount: Decimal) {
        self.total += amount;
        match self.categories.iter_mut().find(|c| c.category == category) {
            Some(existing) => existing.total += amount,
            None => self.categories.push(CategoryTotal {
                category: category.to_string(),
                total: amount,
            }),
        }
    }
}

/// Groups dated records into the labeled buckets of one reporting window.
pub struct Bucketer {
    day_labels: DayLabelStyle,
}

impl Bucketer {
    pub fn new(day_labels: DayLabelStyle) -> Self {
        Self { day_labels }
    }

    fn day_label(&self, day: Weekday) -> String {
        let name = weekday_name(day);
        match self.day_labels {
            DayLabelStyle::Full => name.to_string(),
            DayLabelStyle::Short => name[..3].to_string(),
        }
    }

    /// Every label the series for `window` must contain, in display order.
    pub fn expected_labels(&self, period: GraphPeriod, window: &Window) -> Result<Vec<String>> {
        let labels = match period {
            GraphPeriod::Week => WEEK_DAYS.iter().map(|d| self.day_label(*d)).collect(),
            GraphPeriod::Month => {
                let weeks = iso_week_span(window.start().date_naive(), window.last_day())?;
                (1..=weeks).map(|n| format!("Week {}", n)).collect()
            }
            GraphPeriod::Quarter | GraphPeriod::Year => {
                let mut labels = Vec::new();
                let mut cursor = first_of_month(window.start().date_naive())?;
                while midnight(cursor) < window.end() {
                    labels.push(month_abbreviation(cursor.month()).to_string());
                    cursor = add_months(cursor, 1)?;
                }
                labels
            }
        };
        Ok(labels)
    }

    /// The bucket label for an instant, or `None` when it lies outside the window.
    pub fn label_for(
        &self,
        period: GraphPeriod,
        window: &Window,
        at: DateTime<Utc>,
    ) -> Option<String> {
        if !window.contains(at) {
            return None;
        }
        let label = match period {
            GraphPeriod::Week => self.day_label(at.weekday()),
            GraphPeriod::Month => {
                let offset = week_of_month_offset(at.date_naive(), window.start().date_naive());
                format!("Week {}", offset + 1)
            }
            GraphPeriod::Quarter | GraphPeriod::Year => month_abbreviation(at.month()).to_string(),
        };
        Some(label)
    }

    /// Sums records per label and left-joins the sums onto the expected labels.
    ///
    /// The output has exactly one bucket per expected label, in order; labels
    /// with no records are zero.
    pub fn bucket(
        &self,
        period: GraphPeriod,
        window: &Window,
        records: &[MonetaryRecord],
    ) -> Result<Vec<PeriodBucket>> {
        let expected = self.expected_labels(period, window)?;

        let mut ordered: Vec<&MonetaryRecord> = records.iter().collect();
        ordered.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then_with(|| a.id.cmp(&b.id)));

        let mut groups: HashMap<String, PeriodBucket> = HashMap::new();
        let mut skipped = 0usize;
        for record in ordered {
            let Some(label) = self.label_for(period, window, record.occurred_at) else {
                skipped += 1;
                continue;
            };
            groups
                .entry(label.clone())
                .or_insert_with(|| PeriodBucket::empty(label))
                .add(&record.category, record.amount);
        }

        if skipped > 0 {
            debug!(
                "Skipped {} records outside the {:?} window starting {}",
                skipped,
                period,
                window.start()
            );
        }

        let series: Vec<PeriodBucket> = expected
            .into_iter()
            .map(|label| groups.remove(&label).unwrap_or_else(|| PeriodBucket::empty(label)))
            .collect();

        if !groups.is_empty() {
            debug!(
                "Dropped {} {:?} groups with no expected label",
                groups.len(),
                period
            );
        }

        Ok(series)
    }
}

pub fn series_total(series: &[PeriodBucket]) -> Decimal {
    series.iter().map(|bucket| bucket.total).sum()
}

pub fn has_nonzero(series: &[PeriodBucket]) -> bool {
    series.iter().any(|bucket| !bucket.total.is_zero())
}
