//! # Gig Income Analytics
//!
//! The reporting engine behind a gig-work income and expense tracker: dense
//! time-bucketed graph series, category pie breakdowns, income averages,
//! next-shift income prediction, and two-week savings sprints.
//!
//! ## Core Concepts
//!
//! - **Owner scope**: every query and computation is filtered by an [`OwnerId`]; a
//!   document belonging to anyone else fails the request
//! - **Reporting windows**: the current week (Sunday start), month, quarter and year,
//!   each half-open in UTC
//! - **Dense series**: one bucket per expected label, zero-filled, so a month always
//!   has as many "Week N" buckets as its ISO-week span
//! - **Multi-source merge**: standalone expenses and the expenses embedded in shifts
//!   are bucketed separately, then merged by label and category
//! - **Sprints**: 14-day goal windows whose shift set is kept current both by full
//!   recompute and by incremental updates
//!
//! ## Example
//!
//! ```rust,ignore
//! use gig_income_analytics::*;
//! use chrono::Utc;
//!
//! let store = MemoryStore::new();
//! let analytics = GigAnalytics::new(store);
//! let owner = OwnerId::new("user-42")?;
//!
//! let income = analytics.income_dashboard(&owner, Utc::now()).await?;
//! println!("{}", serde_json::to_string_pretty(&income)?);
//!
//! if let Some(next) = analytics.predict_next_shift_income(&owner, Utc::now()).await? {
//!     println!("{} shift: {:?}", next.weekday, next.prediction);
//! }
//! ```

pub mod bucketer;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod datasets;
pub mod error;
pub mod estimators;
pub mod ingestion;
pub mod merge;
pub mod schema;
pub mod sprint;
pub mod store;

pub use bucketer::{Bucketer, CategoryTotal, GraphPeriod, PeriodBucket};
pub use calendar::{period_window, Period, Window};
pub use config::{AnalyticsConfig, DayLabelStyle, PieOrder};
pub use dashboard::{
    build_expense_dashboard, build_income_dashboard, predict_next_shift_income,
    recompute_sprint_shift_set, ExpenseDashboard, IncomeDashboard, YtdExpenseSummary,
};
pub use datasets::{CategoryBreakdown, DatasetBuilder, GraphData, PieData};
pub use error::{AnalyticsError, Result, StoreError, StoreResult};
pub use estimators::{IncomeAverages, NextShiftPrediction};
pub use merge::{merge_all, merge_series};
pub use schema::*;
pub use sprint::{ShiftChange, SprintEdit, SprintProgress, SprintTracker};
pub use store::{MemoryStore, RecordStore, ShiftFilter};

use chrono::{DateTime, Utc};
use log::info;

/// Owns a store and a validated configuration and exposes the request entry points.
pub struct GigAnalytics<S> {
    store: S,
    config: AnalyticsConfig,
}

impl<S: RecordStore> GigAnalytics<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: AnalyticsConfig::default(),
        }
    }

    pub fn with_config(store: S, config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "Analytics configured: {} sprint update attempts, {:?} day labels, {:?} pie order",
            config.max_sprint_update_attempts, config.day_labels, config.pie_order
        );
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn sprints(&self) -> SprintTracker<'_, S> {
        SprintTracker::new(&self.store, &self.config)
    }

    pub async fn income_dashboard(
        &self,
        owner: &OwnerId,
        now: DateTime<Utc>,
    ) -> Result<IncomeDashboard> {
        build_income_dashboard(&self.store, &self.config, owner, now).await
    }

    pub async fn expense_dashboard(
        &self,
        owner: &OwnerId,
        now: DateTime<Utc>,
    ) -> Result<ExpenseDashboard> {
        build_expense_dashboard(&self.store, &self.config, owner, now).await
    }

    pub async fn predict_next_shift_income(
        &self,
        owner: &OwnerId,
        now: DateTime<Utc>,
    ) -> Result<Option<NextShiftPrediction>> {
        predict_next_shift_income(&self.store, owner, now).await
    }

    pub async fn recompute_sprint_shift_set(&self, sprint_id: &SprintId) -> Result<Vec<ShiftId>> {
        recompute_sprint_shift_set(&self.store, &self.config, sprint_id).await
    }
}
