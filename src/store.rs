//! The data-access boundary the analytics engine reads through.
//!
//! Every operation is scoped by [`OwnerId`]. [`MemoryStore`] is an in-process
//! implementation suitable for tests and embedding.

use crate::calendar::Window;
use crate::error::{AnalyticsError, Result, StoreError, StoreResult};
use crate::schema::{MonetaryRecord, OwnerId, Shift, ShiftId, Sprint, SprintId};
use chrono::{DateTime, Datelike, Utc, Weekday};
use futures::future;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

/// Which of an owner's shifts a query returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ShiftFilter {
    /// Shifts starting inside the half-open window, optionally by completion flag.
    Window {
        window: Window,
        completed: Option<bool>,
    },
    Completed(bool),
    /// The single incomplete shift with the earliest start (empty when none).
    EarliestIncomplete,
    /// Completed shifts whose start falls on the given UTC weekday.
    CompletedOnWeekday(Weekday),
    /// Shifts starting inside `[start, end]`, both ends inclusive.
    StartingBetween {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Ids(Vec<ShiftId>),
}

impl ShiftFilter {
    pub fn matches(&self, shift: &Shift) -> bool {
        match self {
            ShiftFilter::Window { window, completed } => {
                window.contains(shift.start) && completed.map_or(true, |c| shift.completed == c)
            }
            ShiftFilter::Completed(flag) => shift.completed == *flag,
            ShiftFilter::EarliestIncomplete => !shift.completed,
            ShiftFilter::CompletedOnWeekday(day) => {
                shift.completed && shift.start.weekday() == *day
            }
            ShiftFilter::StartingBetween { start, end } => {
                shift.start >= *start && shift.start <= *end
            }
            ShiftFilter::Ids(ids) => ids.contains(&shift.id),
        }
    }
}

pub trait RecordStore {
    fn list_income_records(
        &self,
        owner: &OwnerId,
        window: Window,
    ) -> impl Future<Output = StoreResult<Vec<MonetaryRecord>>> + Send;

    /// Standalone (vendor) expense records. Shift-embedded expenses are read from shifts.
    fn list_expense_records(
        &self,
        owner: &OwnerId,
        window: Window,
    ) -> impl Future<Output = StoreResult<Vec<MonetaryRecord>>> + Send;

    /// Shifts matching `filter`, ordered by start then id.
    fn list_shifts(
        &self,
        owner: &OwnerId,
        filter: &ShiftFilter,
    ) -> impl Future<Output = StoreResult<Vec<Shift>>> + Send;

    fn get_sprint(
        &self,
        sprint_id: &SprintId,
    ) -> impl Future<Output = StoreResult<Option<Sprint>>> + Send;

    /// The owner's sprint that is not yet completed, if any.
    fn active_sprint(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = StoreResult<Option<Sprint>>> + Send;

    /// Inserts or replaces a sprint.
    ///
    /// The write succeeds only if the stored version equals `sprint.version`
    /// (or the sprint is new and `sprint.version` is 0); the stored copy has
    /// its version bumped and is returned.
    fn save_sprint(&self, sprint: Sprint) -> impl Future<Output = StoreResult<Sprint>> + Send;

    /// Adds and removes shift ids on a sprint if its version still equals `expected_version`.
    fn update_sprint_shift_set(
        &self,
        sprint_id: &SprintId,
        expected_version: u64,
        add: &[ShiftId],
        remove: &[ShiftId],
    ) -> impl Future<Output = StoreResult<Sprint>> + Send;
}

/// Fails if any fetched document belongs to someone other than `owner`.
pub fn ensure_owned<'a>(
    owner: &OwnerId,
    owners: impl IntoIterator<Item = &'a OwnerId>,
) -> Result<()> {
    for found in owners {
        if found != owner {
            return Err(AnalyticsError::OwnerScopeViolation {
                expected: owner.to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Default)]
struct Tables {
    income: Vec<MonetaryRecord>,
    expenses: Vec<MonetaryRecord>,
    shifts: BTreeMap<ShiftId, Shift>,
    sprints: BTreeMap<SprintId, Sprint>,
    pending_conflicts: u32,
}

impl Tables {
    fn take_conflict(&mut self, sprint_id: &SprintId) -> StoreResult<()> {
        if self.pending_conflicts > 0 {
            self.pending_conflicts -= 1;
            return Err(StoreError::Conflict {
                sprint_id: sprint_id.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    pub fn insert_income(&self, record: MonetaryRecord) -> StoreResult<()> {
        self.tables()?.income.push(record);
        Ok(())
    }

    pub fn insert_expense(&self, record: MonetaryRecord) -> StoreResult<()> {
        self.tables()?.expenses.push(record);
        Ok(())
    }

    pub fn upsert_shift(&self, shift: Shift) -> StoreResult<()> {
        self.tables()?.shifts.insert(shift.id.clone(), shift);
        Ok(())
    }

    pub fn remove_shift(&self, shift_id: &ShiftId) -> StoreResult<Option<Shift>> {
        Ok(self.tables()?.shifts.remove(shift_id))
    }

    /// Makes the next `count` sprint writes fail with [`StoreError::Conflict`],
    /// as if another writer got there first.
    pub fn inject_conflicts(&self, count: u32) -> StoreResult<()> {
        self.tables()?.pending_conflicts = count;
        Ok(())
    }

    fn records_in(
        records: &[MonetaryRecord],
        owner: &OwnerId,
        window: Window,
    ) -> Vec<MonetaryRecord> {
        let mut found: Vec<MonetaryRecord> = records
            .iter()
            .filter(|r| &r.owner_id == owner && window.contains(r.occurred_at))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then_with(|| a.id.cmp(&b.id)));
        found
    }

    fn shifts_matching(&self, owner: &OwnerId, filter: &ShiftFilter) -> StoreResult<Vec<Shift>> {
        let tables = self.tables()?;
        let mut found: Vec<Shift> = tables
            .shifts
            .values()
            .filter(|s| &s.owner_id == owner && filter.matches(s))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        if *filter == ShiftFilter::EarliestIncomplete {
            found.truncate(1);
        }
        Ok(found)
    }

    fn save(&self, mut sprint: Sprint) -> StoreResult<Sprint> {
        let mut tables = self.tables()?;
        tables.take_conflict(&sprint.id)?;

        let stored_version = tables.sprints.get(&sprint.id).map(|s| s.version).unwrap_or(0);
        if stored_version != sprint.version {
            return Err(StoreError::Conflict {
                sprint_id: sprint.id.to_string(),
            });
        }

        sprint.version += 1;
        tables.sprints.insert(sprint.id.clone(), sprint.clone());
        Ok(sprint)
    }

    fn update_shift_set(
        &self,
        sprint_id: &SprintId,
        expected_version: u64,
        add: &[ShiftId],
        remove: &[ShiftId],
    ) -> StoreResult<Sprint> {
        let mut tables = self.tables()?;
        tables.take_conflict(sprint_id)?;

        let sprint = tables
            .sprints
            .get_mut(sprint_id)
            .ok_or_else(|| StoreError::NotFound(format!("sprint {}", sprint_id)))?;
        if sprint.version != expected_version {
            return Err(StoreError::Conflict {
                sprint_id: sprint_id.to_string(),
            });
        }

        let removed: BTreeSet<&ShiftId> = remove.iter().collect();
        sprint.shift_ids.retain(|id| !removed.contains(id));
        sprint.shift_ids.extend(add.iter().cloned());
        sprint.version += 1;
        Ok(sprint.clone())
    }
}

impl RecordStore for MemoryStore {
    fn list_income_records(
        &self,
        owner: &OwnerId,
        window: Window,
    ) -> impl Future<Output = StoreResult<Vec<MonetaryRecord>>> + Send {
        let result = self
            .tables()
            .map(|tables| Self::records_in(&tables.income, owner, window));
        future::ready(result)
    }

    fn list_expense_records(
        &self,
        owner: &OwnerId,
        window: Window,
    ) -> impl Future<Output = StoreResult<Vec<MonetaryRecord>>> + Send {
        let result = self
            .tables()
            .map(|tables| Self::records_in(&tables.expenses, owner, window));
        future::ready(result)
    }

    fn list_shifts(
        &self,
        owner: &OwnerId,
        filter: &ShiftFilter,
    ) -> impl Future<Output = StoreResult<Vec<Shift>>> + Send {
        future::ready(self.shifts_matching(owner, filter))
    }

    fn get_sprint(
        &self,
        sprint_id: &SprintId,
    ) -> impl Future<Output = StoreResult<Option<Sprint>>> + Send {
        let result = self
            .tables()
            .map(|tables| tables.sprints.get(sprint_id).cloned());
        future::ready(result)
    }

    fn active_sprint(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = StoreResult<Option<Sprint>>> + Send {
        let result = self.tables().map(|tables| {
            tables
                .sprints
                .values()
                .filter(|s| &s.owner_id == owner && !s.is_completed)
                .min_by_key(|s| s.start)
                .cloned()
        });
        future::ready(result)
    }

    fn save_sprint(&self, sprint: Sprint) -> impl Future<Output = StoreResult<Sprint>> + Send {
        future::ready(self.save(sprint))
    }

    fn update_sprint_shift_set(
        &self,
        sprint_id: &SprintId,
        expected_version: u64,
        add: &[ShiftId],
        remove: &[ShiftId],
    ) -> impl Future<Output = StoreResult<Sprint>> + Send {
        future::ready(self.update_shift_set(sprint_id, expected_version, add, remove))
    }
}
