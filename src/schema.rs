use crate::error::AnalyticsError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Document id of a [`Shift`].
    ShiftId
);
string_id!(
    /// Document id of a [`Sprint`].
    SprintId
);
string_id!(
    /// Document id of a [`Venue`].
    VenueId
);
string_id!(
    /// Document id of a [`MonetaryRecord`].
    RecordId
);

/// The user every query and computation is scoped to.
///
/// A blank owner never reaches the store: construction and deserialization both
/// fail with [`AnalyticsError::MissingOwnerScope`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Result<Self, AnalyticsError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AnalyticsError::MissingOwnerScope);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = AnalyticsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        value.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dated amount of money: an income entry tied to a shift, or an expense tied to a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryRecord {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub occurred_at: DateTime<Utc>,
    pub amount: Decimal,
    #[schemars(description = "Income type (e.g. 'cash', 'card') or expense category (e.g. 'fuel', 'houseFee')")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<ShiftId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShiftIncome {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseItem {
    pub category: String,
    pub amount: Decimal,
}

/// Expenses recorded directly on a shift.
///
/// `total_shift_expenses` is stored alongside the items and is not re-derived
/// from them; year-to-date totals read it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftExpenses {
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
    pub total_shift_expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: ShiftId,
    pub owner_id: OwnerId,
    pub venue_id: VenueId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub income: Option<ShiftIncome>,
    #[serde(default)]
    pub expenses: Option<ShiftExpenses>,
    #[serde(default)]
    pub mileage: f64,
}

impl Shift {
    /// Income earned on the shift, zero when none was recorded.
    pub fn income_amount(&self) -> Decimal {
        self.income
            .as_ref()
            .map(|income| income.amount)
            .unwrap_or(Decimal::ZERO)
    }
}

/// A recurring work location ("club" or "gig").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: VenueId,
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub shift_ids: Vec<ShiftId>,
}

impl Venue {
    /// Records a shift in the back-reference list. Returns false if it was already there.
    pub fn attach_shift(&mut self, shift_id: ShiftId) -> bool {
        if self.shift_ids.contains(&shift_id) {
            return false;
        }
        self.shift_ids.push(shift_id);
        true
    }

    /// Drops a shift from the back-reference list. Returns false if it was not there.
    pub fn detach_shift(&mut self, shift_id: &ShiftId) -> bool {
        let before = self.shift_ids.len();
        self.shift_ids.retain(|id| id != shift_id);
        before != self.shift_ids.len()
    }
}

/// A fixed two-week savings goal window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: SprintId,
    pub owner_id: OwnerId,
    pub start: DateTime<Utc>,
    #[schemars(description = "Always start + 14 days; never set independently")]
    pub end: DateTime<Utc>,
    pub goal: Decimal,
    #[serde(default)]
    pub shift_ids: BTreeSet<ShiftId>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub goal_met: bool,
    #[serde(default)]
    #[schemars(description = "Optimistic concurrency token, bumped by every store write")]
    pub version: u64,
}
