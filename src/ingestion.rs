use crate::schema::{MonetaryRecord, RecordId, Shift};
use rust_decimal::Decimal;

/// Flattens the itemized expenses embedded in shifts into standalone-shaped records.
///
/// Each non-zero item becomes one record dated at the shift start, so the
/// result can be bucketed exactly like vendor expense records.
pub fn shift_expense_records(shifts: &[Shift]) -> Vec<MonetaryRecord> {
    let mut records = Vec::new();

    for shift in shifts {
        let Some(expenses) = &shift.expenses else {
            continue;
        };

        for (idx, item) in expenses.items.iter().enumerate() {
            if item.amount.is_zero() {
                continue;
            }

            records.push(MonetaryRecord {
                id: RecordId::new(format!("{}#expense-{}", shift.id, idx)),
                owner_id: shift.owner_id.clone(),
                occurred_at: shift.start,
                amount: item.amount,
                category: item.category.clone(),
                shift_id: Some(shift.id.clone()),
                vendor: None,
            });
        }
    }

    records
}

/// Sum of the `totalShiftExpenses` field across shifts, as stored.
pub fn shift_expense_total(shifts: &[Shift]) -> Decimal {
    shifts
        .iter()
        .filter_map(|shift| shift.expenses.as_ref())
        .map(|expenses| expenses.total_shift_expenses)
        .sum()
}

pub fn record_total(records: &[MonetaryRecord]) -> Decimal {
    records.iter().map(|record| record.amount).sum()
}
