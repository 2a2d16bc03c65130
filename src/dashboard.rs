//! Request-level entry points: fetch an owner's records, then build the payloads.
//!
//! Every sub-query of a request runs concurrently and every fetched document is
//! re-checked against the requested owner. Any failure fails the whole request.

use crate::calendar::Window;
use crate::config::AnalyticsConfig;
use crate::datasets::{
    DatasetBuilder, GraphData, PeriodRecords, PieData, ReportingRecords, ReportingWindows,
};
use crate::error::{AnalyticsError, Result};
use crate::estimators::{income_averages, predict_from_history, IncomeAverages, NextShiftPrediction};
use crate::ingestion::{record_total, shift_expense_records, shift_expense_total};
use crate::schema::{MonetaryRecord, OwnerId, Shift, ShiftId, SprintId};
use crate::sprint::{SprintProgress, SprintTracker};
use crate::store::{ensure_owned, RecordStore, ShiftFilter};
use chrono::{DateTime, Datelike, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeDashboard {
    pub sprint: Option<SprintProgress>,
    pub averages: IncomeAverages,
    pub graph_data: GraphData,
}

/// Year-to-date expense totals by source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct YtdExpenseSummary {
    pub standalone: Decimal,
    #[schemars(description = "Sum of totalShiftExpenses over shifts starting this year")]
    pub shift_embedded: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDashboard {
    pub graph_data: GraphData,
    pub pie_data: PieData,
    pub ytd: YtdExpenseSummary,
}

impl IncomeDashboard {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(IncomeDashboard)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

impl ExpenseDashboard {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ExpenseDashboard)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

fn check_records(owner: &OwnerId, records: &[MonetaryRecord]) -> Result<()> {
    ensure_owned(owner, records.iter().map(|r| &r.owner_id))
}

fn check_shifts(owner: &OwnerId, shifts: &[Shift]) -> Result<()> {
    ensure_owned(owner, shifts.iter().map(|s| &s.owner_id))
}

async fn income_period<S: RecordStore>(
    store: &S,
    owner: &OwnerId,
    window: Window,
) -> Result<PeriodRecords> {
    let records = store.list_income_records(owner, window).await?;
    check_records(owner, &records)?;
    Ok(PeriodRecords {
        window,
        sources: vec![records],
    })
}

/// Standalone expenses plus the expenses embedded in shifts starting in the window.
///
/// Returns the period's sources together with the shifts they came from.
async fn expense_period<S: RecordStore>(
    store: &S,
    owner: &OwnerId,
    window: Window,
) -> Result<(PeriodRecords, Vec<Shift>)> {
    let filter = ShiftFilter::Window {
        window,
        completed: None,
    };
    let (standalone, shifts) = futures::try_join!(
        store.list_expense_records(owner, window),
        store.list_shifts(owner, &filter),
    )?;
    check_records(owner, &standalone)?;
    check_shifts(owner, &shifts)?;

    let embedded = shift_expense_records(&shifts);
    Ok((
        PeriodRecords {
            window,
            sources: vec![standalone, embedded],
        },
        shifts,
    ))
}

async fn year_shifts<S: RecordStore>(store: &S, owner: &OwnerId, window: Window) -> Result<Vec<Shift>> {
    let filter = ShiftFilter::Window {
        window,
        completed: Some(true),
    };
    let shifts = store.list_shifts(owner, &filter).await?;
    check_shifts(owner, &shifts)?;
    Ok(shifts)
}

pub async fn build_income_dashboard<S: RecordStore>(
    store: &S,
    config: &AnalyticsConfig,
    owner: &OwnerId,
    now: DateTime<Utc>,
) -> Result<IncomeDashboard> {
    info!("Building income dashboard for {} at {}", owner, now);
    let windows = ReportingWindows::at(now)?;
    let tracker = SprintTracker::new(store, config);

    let (week, month, quarter, year, worked, sprint) = futures::try_join!(
        income_period(store, owner, windows.week),
        income_period(store, owner, windows.month),
        income_period(store, owner, windows.quarter),
        income_period(store, owner, windows.year),
        year_shifts(store, owner, windows.year),
        tracker.progress(owner, now),
    )?;

    let records = ReportingRecords {
        week,
        month,
        quarter,
        year,
    };
    let graph_data = DatasetBuilder::new(config).graph_data(&records)?;
    let averages = income_averages(&worked, &windows.year);
    debug!(
        "Income dashboard for {}: {} completed shifts this year, default dataset {:?}",
        owner, averages.shift_count, graph_data.default_dataset
    );

    Ok(IncomeDashboard {
        sprint,
        averages,
        graph_data,
    })
}

pub async fn build_expense_dashboard<S: RecordStore>(
    store: &S,
    config: &AnalyticsConfig,
    owner: &OwnerId,
    now: DateTime<Utc>,
) -> Result<ExpenseDashboard> {
    info!("Building expense dashboard for {} at {}", owner, now);
    let windows = ReportingWindows::at(now)?;

    let ((week, _), (month, _), (quarter, _), (year, shifts_this_year)) = futures::try_join!(
        expense_period(store, owner, windows.week),
        expense_period(store, owner, windows.month),
        expense_period(store, owner, windows.quarter),
        expense_period(store, owner, windows.year),
    )?;

    let standalone = record_total(year.sources.first().map(Vec::as_slice).unwrap_or_default());
    let shift_embedded = shift_expense_total(&shifts_this_year);
    let ytd = YtdExpenseSummary {
        standalone,
        shift_embedded,
        total: standalone + shift_embedded,
    };

    let records = ReportingRecords {
        week,
        month,
        quarter,
        year,
    };
    let builder = DatasetBuilder::new(config);
    let graph_data = builder.graph_data(&records)?;
    let pie_data = builder.pie_data(&records);
    debug!(
        "Expense dashboard for {}: ytd total {}, default dataset {:?}",
        owner, ytd.total, graph_data.default_dataset
    );

    Ok(ExpenseDashboard {
        graph_data,
        pie_data,
        ytd,
    })
}

/// Median income of completed shifts on the weekday of the owner's next shift.
///
/// `Ok(None)` when the owner has no incomplete shift; a prediction with
/// `prediction: None` when there is no matching history.
pub async fn predict_next_shift_income<S: RecordStore>(
    store: &S,
    owner: &OwnerId,
    now: DateTime<Utc>,
) -> Result<Option<NextShiftPrediction>> {
    let upcoming = store.list_shifts(owner, &ShiftFilter::EarliestIncomplete).await?;
    check_shifts(owner, &upcoming)?;
    let Some(next) = upcoming.into_iter().next() else {
        debug!("No upcoming shift for {}", owner);
        return Ok(None);
    };

    let filter = ShiftFilter::CompletedOnWeekday(next.start.weekday());
    let history = store.list_shifts(owner, &filter).await?;
    check_shifts(owner, &history)?;

    let prediction = predict_from_history(&next, &history, now);
    info!(
        "Predicted {:?} for {}'s next shift {} from {} samples",
        prediction.prediction, owner, next.id, prediction.sample_size
    );
    Ok(Some(prediction))
}

pub async fn recompute_sprint_shift_set<S: RecordStore>(
    store: &S,
    config: &AnalyticsConfig,
    sprint_id: &SprintId,
) -> Result<Vec<ShiftId>> {
    info!("Recomputing shift set for sprint {}", sprint_id);
    SprintTracker::new(store, config)
        .recompute_shift_set(sprint_id)
        .await
}

/// Parses a raw owner id from a request, failing closed on a blank one.
pub fn owner_scope(raw: Option<&str>) -> Result<OwnerId> {
    match raw {
        Some(id) => OwnerId::new(id),
        None => Err(AnalyticsError::MissingOwnerScope),
    }
}
