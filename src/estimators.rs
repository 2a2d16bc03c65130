use crate::calendar::{midnight, weekday_name, Window};
use crate::schema::{Shift, ShiftId};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Income averages over completed shifts in one window (normally the current year).
///
/// Weeks and months without shifts are left out of the denominators; an
/// average over nothing is `None`, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeAverages {
    pub per_shift: Option<Decimal>,
    pub per_week: Option<Decimal>,
    pub per_month: Option<Decimal>,
    #[schemars(description = "Total income for the window")]
    pub per_year: Decimal,
    pub shift_count: u32,
    pub week_count: u32,
    pub month_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextShiftPrediction {
    #[schemars(description = "Median income of completed shifts on the same weekday; null without history")]
    pub prediction: Option<Decimal>,
    pub next_shift_id: ShiftId,
    pub next_shift_start: DateTime<Utc>,
    pub weekday: String,
    pub sample_size: u32,
    #[schemars(description = "Whole calendar days from now until the shift (negative if it is overdue)")]
    pub days_until: i64,
}

pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len()))
}

pub fn median(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort();

    let len = sorted.len();
    if len % 2 == 0 {
        Some((sorted[len / 2 - 1] + sorted[len / 2]) / Decimal::TWO)
    } else {
        Some(sorted[len / 2])
    }
}

pub fn income_averages(shifts: &[Shift], window: &Window) -> IncomeAverages {
    let worked: Vec<&Shift> = shifts
        .iter()
        .filter(|s| s.completed && window.contains(s.start))
        .collect();

    let per_shift_income: Vec<Decimal> = worked.iter().map(|s| s.income_amount()).collect();

    let mut weekly: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    let mut monthly: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for shift in &worked {
        let iso = shift.start.iso_week();
        *weekly.entry((iso.year(), iso.week())).or_default() += shift.income_amount();
        *monthly
            .entry((shift.start.year(), shift.start.month()))
            .or_default() += shift.income_amount();
    }

    let weekly_totals: Vec<Decimal> = weekly.into_values().collect();
    let monthly_totals: Vec<Decimal> = monthly.into_values().collect();

    IncomeAverages {
        per_shift: mean(&per_shift_income),
        per_week: mean(&weekly_totals),
        per_month: mean(&monthly_totals),
        per_year: per_shift_income.iter().sum(),
        shift_count: per_shift_income.len() as u32,
        week_count: weekly_totals.len() as u32,
        month_count: monthly_totals.len() as u32,
    }
}

/// The incomplete shift with the earliest start; ties go to the smaller id.
pub fn earliest_incomplete(shifts: &[Shift]) -> Option<&Shift> {
    shifts
        .iter()
        .filter(|s| !s.completed)
        .min_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)))
}

/// Predicts income for `next` from completed shifts on the same UTC weekday.
pub fn predict_from_history(
    next: &Shift,
    history: &[Shift],
    now: DateTime<Utc>,
) -> NextShiftPrediction {
    let day = next.start.weekday();
    let samples: Vec<Decimal> = history
        .iter()
        .filter(|s| s.completed && s.start.weekday() == day)
        .map(|s| s.income_amount())
        .collect();

    let days_until =
        (midnight(next.start.date_naive()) - midnight(now.date_naive())).num_days();

    NextShiftPrediction {
        prediction: median(&samples),
        next_shift_id: next.id.clone(),
        next_shift_start: next.start,
        weekday: weekday_name(day).to_string(),
        sample_size: samples.len() as u32,
        days_until,
    }
}
