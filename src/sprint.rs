//! Two-week savings sprints.
//!
//! A sprint is `ACTIVE` until completed; completion is terminal and is the only
//! moment `goal_met` is decided. Its `shift_ids` mirror the owner's shifts whose
//! start lies in `[start, end]` (both ends inclusive). Two paths keep that set
//! current: a full recompute from the window, and incremental adds/removes as
//! single shifts change. Both converge on the same set.

use crate::calendar::{add_days, midnight};
use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, Result, StoreError};
use crate::schema::{OwnerId, Shift, ShiftId, Sprint, SprintId};
use crate::store::{ensure_owned, RecordStore, ShiftFilter};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const SPRINT_LENGTH_DAYS: u64 = 14;

/// Sprint boundaries for a requested start: midnight UTC of its date, plus 14 days.
pub fn sprint_bounds(start: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let first_day = start.date_naive();
    let end_day = add_days(first_day, SPRINT_LENGTH_DAYS)?;
    Ok((midnight(first_day), midnight(end_day)))
}

fn validate_goal(goal: Decimal) -> Result<()> {
    if goal < Decimal::ZERO {
        return Err(AnalyticsError::InvalidSprintGoal(goal));
    }
    Ok(())
}

/// Builds a new, empty, active sprint with derived boundaries.
pub fn plan_sprint(
    id: SprintId,
    owner: &OwnerId,
    start: DateTime<Utc>,
    goal: Decimal,
) -> Result<Sprint> {
    validate_goal(goal)?;
    let (start, end) = sprint_bounds(start)?;
    Ok(Sprint {
        id,
        owner_id: owner.clone(),
        start,
        end,
        goal,
        shift_ids: BTreeSet::new(),
        is_completed: false,
        goal_met: false,
        version: 0,
    })
}

pub fn window_filter(sprint: &Sprint) -> ShiftFilter {
    ShiftFilter::StartingBetween {
        start: sprint.start,
        end: sprint.end,
    }
}

pub fn in_sprint_window(sprint: &Sprint, shift: &Shift) -> bool {
    shift.owner_id == sprint.owner_id && window_filter(sprint).matches(shift)
}

/// The shift set a sprint should hold, computed from scratch.
pub fn target_shift_set(sprint: &Sprint, shifts: &[Shift]) -> BTreeSet<ShiftId> {
    shifts
        .iter()
        .filter(|shift| in_sprint_window(sprint, shift))
        .map(|shift| shift.id.clone())
        .collect()
}

/// Ids to add and remove to turn `current` into `target`.
pub fn shift_set_delta(
    current: &BTreeSet<ShiftId>,
    target: &BTreeSet<ShiftId>,
) -> (Vec<ShiftId>, Vec<ShiftId>) {
    let add = target.difference(current).cloned().collect();
    let remove = current.difference(target).cloned().collect();
    (add, remove)
}

/// Sum of income over the shifts the sprint references.
pub fn sprint_income(sprint: &Sprint, shifts: &[Shift]) -> Decimal {
    shifts
        .iter()
        .filter(|shift| sprint.shift_ids.contains(&shift.id))
        .map(|shift| shift.income_amount())
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SprintProgress {
    pub sprint_id: SprintId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub goal: Decimal,
    pub progress: Decimal,
    pub remaining_to_goal: Decimal,
    pub percent_of_goal: Option<Decimal>,
    pub shift_count: u32,
    pub days_remaining: i64,
    pub hours_remaining: i64,
    pub is_completed: bool,
    #[schemars(description = "Only known once the sprint is completed")]
    pub goal_met: Option<bool>,
}

pub fn sprint_progress(sprint: &Sprint, shifts: &[Shift], now: DateTime<Utc>) -> SprintProgress {
    let progress = sprint_income(sprint, shifts);
    let remaining = (sprint.end - now).max(chrono::Duration::zero());
    let percent_of_goal = if sprint.goal.is_zero() {
        None
    } else {
        Some((progress / sprint.goal * Decimal::ONE_HUNDRED).round_dp(2))
    };

    SprintProgress {
        sprint_id: sprint.id.clone(),
        start: sprint.start,
        end: sprint.end,
        goal: sprint.goal,
        progress,
        remaining_to_goal: (sprint.goal - progress).max(Decimal::ZERO),
        percent_of_goal,
        shift_count: sprint.shift_ids.len() as u32,
        days_remaining: remaining.num_days(),
        hours_remaining: remaining.num_hours(),
        is_completed: sprint.is_completed,
        goal_met: sprint.is_completed.then_some(sprint.goal_met),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprintEdit {
    pub start: Option<DateTime<Utc>>,
    pub goal: Option<Decimal>,
}

/// A change to one shift that may move it into or out of the active sprint.
#[derive(Debug, Clone, PartialEq)]
pub enum ShiftChange {
    Upserted(Shift),
    Deleted(ShiftId),
}

/// Read-modify-write operations on sprint documents, retried on version conflicts.
pub struct SprintTracker<'a, S> {
    store: &'a S,
    max_attempts: u32,
}

impl<'a, S: RecordStore> SprintTracker<'a, S> {
    pub fn new(store: &'a S, config: &AnalyticsConfig) -> Self {
        Self {
            store,
            max_attempts: config.max_sprint_update_attempts.max(1),
        }
    }

    fn exhausted(&self, sprint_id: impl ToString) -> AnalyticsError {
        AnalyticsError::ConcurrentSprintUpdate {
            sprint_id: sprint_id.to_string(),
            attempts: self.max_attempts,
        }
    }

    async fn load(&self, sprint_id: &SprintId) -> Result<Sprint> {
        self.store
            .get_sprint(sprint_id)
            .await?
            .ok_or_else(|| AnalyticsError::SprintNotFound(sprint_id.to_string()))
    }

    async fn load_active(&self, sprint_id: &SprintId) -> Result<Sprint> {
        let sprint = self.load(sprint_id).await?;
        if sprint.is_completed {
            return Err(AnalyticsError::SprintCompleted(sprint_id.to_string()));
        }
        Ok(sprint)
    }

    async fn shifts_in_window(&self, sprint: &Sprint) -> Result<Vec<Shift>> {
        let shifts = self
            .store
            .list_shifts(&sprint.owner_id, &window_filter(sprint))
            .await?;
        ensure_owned(&sprint.owner_id, shifts.iter().map(|s| &s.owner_id))?;
        Ok(shifts)
    }

    async fn referenced_shifts(&self, sprint: &Sprint) -> Result<Vec<Shift>> {
        if sprint.shift_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = ShiftFilter::Ids(sprint.shift_ids.iter().cloned().collect());
        let shifts = self.store.list_shifts(&sprint.owner_id, &filter).await?;
        ensure_owned(&sprint.owner_id, shifts.iter().map(|s| &s.owner_id))?;
        Ok(shifts)
    }

    /// Creates the owner's sprint, seeding `shift_ids` from the shifts already in its window.
    pub async fn create_sprint(
        &self,
        id: SprintId,
        owner: &OwnerId,
        start: DateTime<Utc>,
        goal: Decimal,
    ) -> Result<Sprint> {
        if let Some(active) = self.store.active_sprint(owner).await? {
            return Err(AnalyticsError::ActiveSprintExists(active.id.to_string()));
        }

        let mut sprint = plan_sprint(id, owner, start, goal)?;
        let shifts = self.shifts_in_window(&sprint).await?;
        sprint.shift_ids = target_shift_set(&sprint, &shifts);

        let saved = self.store.save_sprint(sprint).await?;
        info!(
            "Created sprint {} for {} ({} to {}, {} shifts)",
            saved.id,
            owner,
            saved.start,
            saved.end,
            saved.shift_ids.len()
        );
        Ok(saved)
    }

    /// Changes start and/or goal, then rebuilds `shift_ids` from the new window.
    pub async fn edit_sprint(&self, sprint_id: &SprintId, edit: SprintEdit) -> Result<Sprint> {
        if let Some(goal) = edit.goal {
            validate_goal(goal)?;
        }

        for attempt in 1..=self.max_attempts {
            let mut sprint = self.load_active(sprint_id).await?;
            if let Some(start) = edit.start {
                let (start, end) = sprint_bounds(start)?;
                sprint.start = start;
                sprint.end = end;
            }
            if let Some(goal) = edit.goal {
                sprint.goal = goal;
            }

            let shifts = self.shifts_in_window(&sprint).await?;
            sprint.shift_ids = target_shift_set(&sprint, &shifts);

            match self.store.save_sprint(sprint).await {
                Ok(saved) => {
                    info!("Edited sprint {} ({} shifts)", saved.id, saved.shift_ids.len());
                    return Ok(saved);
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!("Sprint {} edit conflicted (attempt {})", sprint_id, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.exhausted(sprint_id))
    }

    /// Replaces `shift_ids` with the set computed from the sprint window and returns it.
    pub async fn recompute_shift_set(&self, sprint_id: &SprintId) -> Result<Vec<ShiftId>> {
        for attempt in 1..=self.max_attempts {
            let sprint = self.load_active(sprint_id).await?;
            let shifts = self.shifts_in_window(&sprint).await?;
            let target = target_shift_set(&sprint, &shifts);
            let (add, remove) = shift_set_delta(&sprint.shift_ids, &target);

            if add.is_empty() && remove.is_empty() {
                debug!("Sprint {} shift set already current", sprint_id);
                return Ok(target.into_iter().collect());
            }

            match self
                .store
                .update_sprint_shift_set(sprint_id, sprint.version, &add, &remove)
                .await
            {
                Ok(updated) => {
                    info!(
                        "Recomputed sprint {}: +{} -{} shifts",
                        sprint_id,
                        add.len(),
                        remove.len()
                    );
                    return Ok(updated.shift_ids.into_iter().collect());
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!("Sprint {} recompute conflicted (attempt {})", sprint_id, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.exhausted(sprint_id))
    }

    /// Adds or removes one shift on the owner's active sprint after it changed.
    ///
    /// Returns the active sprint as stored afterwards, or `None` if the owner
    /// has no active sprint.
    pub async fn apply_shift_change(
        &self,
        owner: &OwnerId,
        change: &ShiftChange,
    ) -> Result<Option<Sprint>> {
        if let ShiftChange::Upserted(shift) = change {
            ensure_owned(owner, [&shift.owner_id])?;
        }

        let mut last_id = None;
        for attempt in 1..=self.max_attempts {
            let Some(sprint) = self.store.active_sprint(owner).await? else {
                return Ok(None);
            };
            ensure_owned(owner, [&sprint.owner_id])?;

            let (add, remove) = match change {
                ShiftChange::Upserted(shift) => {
                    let inside = in_sprint_window(&sprint, shift);
                    let present = sprint.shift_ids.contains(&shift.id);
                    match (inside, present) {
                        (true, false) => (vec![shift.id.clone()], Vec::new()),
                        (false, true) => (Vec::new(), vec![shift.id.clone()]),
                        _ => (Vec::new(), Vec::new()),
                    }
                }
                ShiftChange::Deleted(shift_id) if sprint.shift_ids.contains(shift_id) => {
                    (Vec::new(), vec![shift_id.clone()])
                }
                ShiftChange::Deleted(_) => (Vec::new(), Vec::new()),
            };

            if add.is_empty() && remove.is_empty() {
                return Ok(Some(sprint));
            }

            match self
                .store
                .update_sprint_shift_set(&sprint.id, sprint.version, &add, &remove)
                .await
            {
                Ok(updated) => {
                    debug!(
                        "Sprint {} shift set: +{:?} -{:?}",
                        updated.id, add, remove
                    );
                    return Ok(Some(updated));
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!("Sprint {} update conflicted (attempt {})", sprint.id, attempt);
                    last_id = Some(sprint.id);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(self.exhausted(last_id.map(|id| id.to_string()).unwrap_or_default()))
    }

    /// Marks the sprint completed and records whether the goal was met.
    ///
    /// Completing an already completed sprint returns it unchanged.
    pub async fn complete_sprint(&self, sprint_id: &SprintId) -> Result<Sprint> {
        for attempt in 1..=self.max_attempts {
            let mut sprint = self.load(sprint_id).await?;
            if sprint.is_completed {
                debug!("Sprint {} already completed", sprint_id);
                return Ok(sprint);
            }

            let shifts = self.referenced_shifts(&sprint).await?;
            let progress = sprint_income(&sprint, &shifts);
            sprint.is_completed = true;
            sprint.goal_met = progress >= sprint.goal;

            match self.store.save_sprint(sprint).await {
                Ok(saved) => {
                    info!(
                        "Completed sprint {}: earned {} of {} (goal met: {})",
                        saved.id, progress, saved.goal, saved.goal_met
                    );
                    return Ok(saved);
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!("Sprint {} completion conflicted (attempt {})", sprint_id, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.exhausted(sprint_id))
    }

    /// Completes the owner's active sprint if its window has ended by `now`.
    pub async fn close_expired(&self, owner: &OwnerId, now: DateTime<Utc>) -> Result<Option<Sprint>> {
        match self.store.active_sprint(owner).await? {
            Some(sprint) if sprint.end <= now => self.complete_sprint(&sprint.id).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Progress of the owner's active sprint, if there is one.
    pub async fn progress(&self, owner: &OwnerId, now: DateTime<Utc>) -> Result<Option<SprintProgress>> {
        let Some(sprint) = self.store.active_sprint(owner).await? else {
            return Ok(None);
        };
        ensure_owned(owner, [&sprint.owner_id])?;
        let shifts = self.referenced_shifts(&sprint).await?;
        Ok(Some(sprint_progress(&sprint, &shifts, now)))
    }
}
