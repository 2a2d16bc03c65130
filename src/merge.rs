use crate::bucketer::PeriodBucket;
use log::debug;

/// Merges two series of the same granularity by label.
///
/// Labels keep the order of `primary`, followed by labels only present in
/// `secondary`. Within a shared label the categories of `primary` come first
/// (with matching `secondary` totals added in), then categories only found in
/// `secondary`. Totals are conserved: the merged grand total is the sum of the
/// two inputs' grand totals.
pub fn merge_series(primary: &[PeriodBucket], secondary: &[PeriodBucket]) -> Vec<PeriodBucket> {
    let mut merged: Vec<PeriodBucket> = primary.to_vec();
    let mut appended = 0usize;

    for bucket in secondary {
        match merged.iter_mut().find(|existing| existing.label == bucket.label) {
            Some(existing) => merge_bucket(existing, bucket),
            None => {
                merged.push(bucket.clone());
                appended += 1;
            }
        }
    }

    if appended > 0 {
        debug!("Appended {} labels exclusive to the secondary series", appended);
    }

    merged
}

fn merge_bucket(target: &mut PeriodBucket, other: &PeriodBucket) {
    target.total += other.total;
    for category in &other.categories {
        match target
            .categories
            .iter_mut()
            .find(|existing| existing.category == category.category)
        {
            Some(existing) => existing.total += category.total,
            None => target.categories.push(category.clone()),
        }
    }
}

/// Folds any number of sources into one series, left to right.
pub fn merge_all(sources: Vec<Vec<PeriodBucket>>) -> Vec<PeriodBucket> {
    let mut iter = sources.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    iter.fold(first, |acc, next| merge_series(&acc, &next))
}
