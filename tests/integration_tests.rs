use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use gig_income_analytics::calendar::midnight;
use gig_income_analytics::sprint::target_shift_set;
use gig_income_analytics::*;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::future::Future;

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn owner(name: &str) -> OwnerId {
    OwnerId::new(name).unwrap()
}

fn record(id: &str, who: &str, occurred_at: DateTime<Utc>, amount: i64, category: &str) -> MonetaryRecord {
    MonetaryRecord {
        id: RecordId::new(id),
        owner_id: owner(who),
        occurred_at,
        amount: Decimal::from(amount),
        category: category.to_string(),
        shift_id: None,
        vendor: None,
    }
}

fn shift(id: &str, who: &str, start: DateTime<Utc>, income: Option<i64>, completed: bool) -> Shift {
    Shift {
        id: ShiftId::new(id),
        owner_id: owner(who),
        venue_id: VenueId::new("blue-room"),
        start,
        end: start + Duration::hours(6),
        completed,
        income: income.map(|amount| ShiftIncome {
            amount: Decimal::from(amount),
            kind: "tips".to_string(),
        }),
        expenses: None,
        mileage: 12.5,
    }
}

fn with_expenses(mut shift: Shift, items: &[(&str, i64)]) -> Shift {
    let items: Vec<ExpenseItem> = items
        .iter()
        .map(|(category, amount)| ExpenseItem {
            category: category.to_string(),
            amount: Decimal::from(*amount),
        })
        .collect();
    let total_shift_expenses = items.iter().map(|item| item.amount).sum();
    shift.expenses = Some(ShiftExpenses {
        items,
        total_shift_expenses,
    });
    shift
}

fn totals(series: &[PeriodBucket]) -> Vec<(String, Decimal)> {
    series
        .iter()
        .map(|bucket| (bucket.label.clone(), bucket.total))
        .collect()
}

fn labels(series: &[PeriodBucket]) -> Vec<String> {
    series.iter().map(|bucket| bucket.label.clone()).collect()
}

#[tokio::test]
async fn test_bartender_income_dashboard() -> anyhow::Result<()> {
    // Wednesday, 20 March 2024
    let now = at(2024, 3, 20, 12);
    let analytics = GigAnalytics::new(MemoryStore::new());
    let store = analytics.store();

    store.insert_income(record("r1", "alice", at(2024, 3, 18, 23), 200, "tips"))?;
    store.insert_income(record("r2", "alice", at(2024, 3, 19, 23), 150, "tips"))?;
    store.insert_income(record("r3", "alice", at(2024, 3, 2, 23), 100, "cash"))?;
    store.insert_income(record("r4", "alice", at(2024, 1, 15, 23), 100, "tips"))?;
    store.insert_income(record("bob-1", "bob", at(2024, 3, 18, 23), 9999, "tips"))?;

    store.upsert_shift(shift("s1", "alice", at(2024, 3, 18, 18), Some(200), true))?;
    store.upsert_shift(shift("s2", "alice", at(2024, 3, 19, 18), Some(150), true))?;
    store.upsert_shift(shift("s3", "alice", at(2024, 3, 2, 18), Some(100), true))?;
    store.upsert_shift(shift("s4", "alice", at(2024, 1, 15, 18), Some(100), true))?;
    store.upsert_shift(shift("next", "alice", at(2024, 3, 22, 18), None, false))?;
    store.upsert_shift(shift("bob-s", "bob", at(2024, 3, 18, 18), Some(9999), true))?;

    analytics
        .sprints()
        .create_sprint(SprintId::new("march"), &owner("alice"), at(2024, 3, 10, 15), Decimal::from(300))
        .await?;

    let dashboard = analytics.income_dashboard(&owner("alice"), now).await?;
    let graph = &dashboard.graph_data;

    assert_eq!(graph.default_dataset, Some(GraphPeriod::Week));
    assert_eq!(
        labels(&graph.week),
        vec!["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]
    );
    assert_eq!(graph.week[1].total, Decimal::from(200));
    assert_eq!(graph.week[2].total, Decimal::from(150));

    // March 2024 starts on a Friday and touches five ISO weeks
    assert_eq!(
        totals(&graph.month),
        vec![
            ("Week 1".to_string(), Decimal::from(100)),
            ("Week 2".to_string(), Decimal::ZERO),
            ("Week 3".to_string(), Decimal::from(350)),
            ("Week 4".to_string(), Decimal::ZERO),
            ("Week 5".to_string(), Decimal::ZERO),
        ]
    );
    assert_eq!(
        totals(&graph.quarter),
        vec![
            ("Jan".to_string(), Decimal::from(100)),
            ("Feb".to_string(), Decimal::ZERO),
            ("Mar".to_string(), Decimal::from(450)),
        ]
    );
    assert_eq!(graph.year.len(), 12);
    assert_eq!(bucketer::series_total(&graph.year), Decimal::from(550));

    let averages = &dashboard.averages;
    assert_eq!(averages.shift_count, 4);
    assert_eq!(averages.week_count, 3);
    assert_eq!(averages.month_count, 2);
    assert_eq!(averages.per_shift, Some(Decimal::new(1375, 1)));
    assert_eq!(averages.per_month, Some(Decimal::from(275)));
    assert_eq!(averages.per_year, Decimal::from(550));

    let sprint = dashboard.sprint.as_ref().expect("active sprint");
    assert_eq!(sprint.start, at(2024, 3, 10, 0));
    assert_eq!(sprint.end, at(2024, 3, 24, 0));
    assert_eq!(sprint.shift_count, 3);
    assert_eq!(sprint.progress, Decimal::from(350));
    assert_eq!(sprint.remaining_to_goal, Decimal::ZERO);
    assert_eq!(sprint.percent_of_goal, Some(Decimal::new(11667, 2)));
    assert_eq!(sprint.days_remaining, 3);
    assert_eq!(sprint.hours_remaining, 84);
    assert_eq!(sprint.goal_met, None);

    let json = serde_json::to_value(&dashboard)?;
    assert_eq!(json["graphData"]["defaultDataset"], "week");
    assert!(json["sprint"]["goalMet"].is_null());

    println!("✓ Income dashboard test passed");
    Ok(())
}

#[tokio::test]
async fn test_expense_dashboard_merges_sources() -> anyhow::Result<()> {
    let now = at(2024, 3, 20, 12);
    let analytics = GigAnalytics::new(MemoryStore::new());
    let store = analytics.store();

    store.insert_expense(record("gas", "alice", at(2024, 3, 18, 9), 40, "fuel"))?;
    store.upsert_shift(with_expenses(
        shift("s1", "alice", at(2024, 3, 19, 20), Some(300), true),
        &[("fuel", 10), ("tipout", 25)],
    ))?;
    store.upsert_shift(with_expenses(
        shift("s2", "alice", at(2024, 2, 10, 20), Some(120), true),
        &[("parking", 5)],
    ))?;
    store.upsert_shift(with_expenses(
        shift("old", "alice", at(2023, 12, 30, 20), Some(120), true),
        &[("parking", 500)],
    ))?;

    let dashboard = analytics.expense_dashboard(&owner("alice"), now).await?;

    assert_eq!(dashboard.ytd.standalone, Decimal::from(40));
    assert_eq!(dashboard.ytd.shift_embedded, Decimal::from(40));
    assert_eq!(dashboard.ytd.total, Decimal::from(80));

    let graph = &dashboard.graph_data;
    assert_eq!(graph.default_dataset, Some(GraphPeriod::Week));

    let week_three = &graph.month[2];
    assert_eq!(week_three.label, "Week 3");
    assert_eq!(week_three.total, Decimal::from(75));
    let categories: Vec<(&str, Decimal)> = week_three
        .categories
        .iter()
        .map(|c| (c.category.as_str(), c.total))
        .collect();
    assert_eq!(
        categories,
        vec![("fuel", Decimal::from(50)), ("tipout", Decimal::from(25))]
    );

    assert_eq!(
        totals(&graph.quarter),
        vec![
            ("Jan".to_string(), Decimal::ZERO),
            ("Feb".to_string(), Decimal::from(5)),
            ("Mar".to_string(), Decimal::from(75)),
        ]
    );

    let pie = &dashboard.pie_data;
    assert_eq!(pie.default_dataset, Some(GraphPeriod::Month));
    assert_eq!(pie.month.len(), 2);
    assert_eq!(pie.month[0].label, "fuel");
    assert_eq!(pie.month[0].count, 2);
    assert_eq!(pie.quarter.len(), 3);
    assert_eq!(pie.quarter[2].label, "parking");

    println!("✓ Expense dashboard test passed");
    Ok(())
}

#[tokio::test]
async fn test_empty_owner_has_no_default_dataset() -> anyhow::Result<()> {
    let analytics = GigAnalytics::new(MemoryStore::new());
    let now = at(2024, 12, 11, 8);

    let income = analytics.income_dashboard(&owner("nobody"), now).await?;
    assert_eq!(income.graph_data.default_dataset, None);
    assert!(income.sprint.is_none());
    assert_eq!(income.averages.per_week, None);
    // December 2024 spans six ISO weeks
    assert_eq!(income.graph_data.month.len(), 6);

    let expenses = analytics.expense_dashboard(&owner("nobody"), now).await?;
    assert_eq!(expenses.graph_data.default_dataset, None);
    assert_eq!(expenses.pie_data.default_dataset, None);
    assert!(expenses.pie_data.year.is_empty());
    assert_eq!(expenses.ytd.total, Decimal::ZERO);

    println!("✓ Empty owner test passed");
    Ok(())
}

#[test]
fn test_month_series_length_follows_iso_weeks() {
    let bucketer = Bucketer::new(DayLabelStyle::Full);

    for year in 2019..=2027 {
        for month in 1..=12 {
            let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            let next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
            };
            let days = (next - first).num_days();
            let lead = first.weekday().num_days_from_monday() as i64;
            let weeks = ((lead + days - 1) / 7 + 1) as usize;

            let window = period_window(Period::Month, midnight(first)).unwrap();
            let expected = bucketer.expected_labels(GraphPeriod::Month, &window).unwrap();
            assert_eq!(expected.len(), weeks, "{}-{:02}", year, month);

            let series = bucketer.bucket(GraphPeriod::Month, &window, &[]).unwrap();
            assert_eq!(labels(&series), expected);
        }
    }

    println!("✓ Month series length test passed");
}

#[test]
fn test_zero_fill_keeps_exact_label_set() {
    let bucketer = Bucketer::new(DayLabelStyle::Short);
    let now = at(2024, 5, 15, 12);

    let records = vec![
        record("a", "alice", at(2024, 5, 13, 1), 5, "fuel"),
        record("b", "alice", at(2024, 5, 13, 2), 5, "fuel"),
        record("outside", "alice", at(2024, 4, 30, 2), 500, "fuel"),
    ];

    for period in GraphPeriod::ALL {
        let window = period_window(period.period(), now).unwrap();
        let expected = bucketer.expected_labels(period, &window).unwrap();
        let series = bucketer.bucket(period, &window, &records).unwrap();
        assert_eq!(labels(&series), expected, "{:?}", period);
    }

    let week = period_window(Period::Week, now).unwrap();
    let series = bucketer.bucket(GraphPeriod::Week, &week, &records).unwrap();
    assert_eq!(series[0].label, "Sun");
    assert_eq!(series[1].total, Decimal::from(10));

    println!("✓ Zero-fill label set test passed");
}

#[test]
fn test_merge_conserves_totals() {
    let bucketer = Bucketer::new(DayLabelStyle::Full);
    let window = period_window(Period::Year, at(2024, 6, 1, 0)).unwrap();

    let standalone = vec![
        record("a", "alice", at(2024, 1, 3, 0), 12, "fuel"),
        record("b", "alice", at(2024, 4, 3, 0), 30, "supplies"),
    ];
    let embedded = vec![
        record("c", "alice", at(2024, 1, 9, 0), 8, "tipout"),
        record("d", "alice", at(2024, 4, 9, 0), 4, "fuel"),
        record("e", "alice", at(2024, 11, 9, 0), 6, "fuel"),
    ];

    let a = bucketer.bucket(GraphPeriod::Year, &window, &standalone).unwrap();
    let b = bucketer.bucket(GraphPeriod::Year, &window, &embedded).unwrap();
    let merged = merge_series(&a, &b);

    assert_eq!(
        bucketer::series_total(&merged),
        bucketer::series_total(&a) + bucketer::series_total(&b)
    );
    assert_eq!(labels(&merged), labels(&a));
    assert_eq!(merged[0].categories[0].category, "fuel");
    assert_eq!(merged[0].categories[1].category, "tipout");

    println!("✓ Merge conservation test passed");
}

#[tokio::test]
async fn test_next_shift_prediction() -> anyhow::Result<()> {
    let analytics = GigAnalytics::new(MemoryStore::new());
    let store = analytics.store();
    let now = at(2024, 3, 20, 12);

    // Fridays
    for (id, month, day, income) in [
        ("f1", 3, 1, 10),
        ("f2", 3, 8, 40),
        ("f3", 3, 15, 20),
        ("f4", 2, 23, 30),
    ] {
        store.upsert_shift(shift(id, "alice", at(2024, month, day, 21), Some(income), true))?;
    }
    store.upsert_shift(shift("sat", "alice", at(2024, 3, 16, 21), Some(900), true))?;
    store.upsert_shift(shift("next", "alice", at(2024, 3, 22, 21), None, false))?;
    store.upsert_shift(shift("later", "alice", at(2024, 3, 29, 21), None, false))?;

    let prediction = analytics
        .predict_next_shift_income(&owner("alice"), now)
        .await?
        .expect("upcoming shift");
    assert_eq!(prediction.next_shift_id, ShiftId::new("next"));
    assert_eq!(prediction.weekday, "Friday");
    assert_eq!(prediction.sample_size, 4);
    assert_eq!(prediction.prediction, Some(Decimal::from(25)));
    assert_eq!(prediction.days_until, 2);

    // A Thursday with no history predicts nothing rather than zero
    store.upsert_shift(shift("thu", "carol", at(2024, 3, 21, 21), None, false))?;
    store.upsert_shift(shift("carol-fri", "carol", at(2024, 3, 15, 21), Some(80), true))?;
    let prediction = analytics
        .predict_next_shift_income(&owner("carol"), now)
        .await?
        .expect("upcoming shift");
    assert_eq!(prediction.prediction, None);
    assert_eq!(prediction.sample_size, 0);

    assert!(analytics
        .predict_next_shift_income(&owner("dave"), now)
        .await?
        .is_none());

    println!("✓ Next shift prediction test passed");
    Ok(())
}

#[tokio::test]
async fn test_sprint_incremental_and_recompute_converge() -> anyhow::Result<()> {
    let analytics = GigAnalytics::new(MemoryStore::new());
    let store = analytics.store();
    let tracker = analytics.sprints();
    let alice = owner("alice");

    let sprint = tracker
        .create_sprint(SprintId::new("jan"), &alice, at(2024, 1, 1, 9), Decimal::from(1000))
        .await?;
    assert_eq!(sprint.end, at(2024, 1, 15, 0));
    assert!(sprint.shift_ids.is_empty());

    let mut changes = vec![
        shift("a", "alice", at(2024, 1, 2, 20), Some(100), true),
        shift("b", "alice", at(2024, 1, 15, 0), Some(100), true),
        shift("c", "alice", at(2024, 1, 20, 20), Some(100), true),
        shift("d", "alice", at(2024, 1, 9, 20), Some(100), false),
    ];
    for change in &changes {
        store.upsert_shift(change.clone())?;
        tracker
            .apply_shift_change(&alice, &ShiftChange::Upserted(change.clone()))
            .await?;
    }

    // Move "a" out of the window and "c" into it
    changes[0].start = at(2024, 2, 2, 20);
    changes[2].start = at(2024, 1, 14, 20);
    for moved in [&changes[0], &changes[2]] {
        store.upsert_shift(moved.clone())?;
        tracker
            .apply_shift_change(&alice, &ShiftChange::Upserted(moved.clone()))
            .await?;
    }

    store.remove_shift(&ShiftId::new("d"))?;
    tracker
        .apply_shift_change(&alice, &ShiftChange::Deleted(ShiftId::new("d")))
        .await?;

    let incremental = store.get_sprint(&SprintId::new("jan")).await?.expect("sprint");
    let all_shifts = store.list_shifts(&alice, &ShiftFilter::Completed(true)).await?;
    let from_scratch = target_shift_set(&incremental, &all_shifts);
    assert_eq!(incremental.shift_ids, from_scratch);

    let recomputed = analytics.recompute_sprint_shift_set(&SprintId::new("jan")).await?;
    let recomputed: BTreeSet<ShiftId> = recomputed.into_iter().collect();
    assert_eq!(recomputed, incremental.shift_ids);
    assert_eq!(
        recomputed,
        [ShiftId::new("b"), ShiftId::new("c")].into_iter().collect()
    );

    println!("✓ Sprint convergence test passed");
    Ok(())
}

#[tokio::test]
async fn test_sprint_edit_recomputes_and_completion_is_terminal() -> anyhow::Result<()> {
    let analytics = GigAnalytics::new(MemoryStore::new());
    let store = analytics.store();
    let tracker = analytics.sprints();
    let alice = owner("alice");

    store.upsert_shift(shift("jan", "alice", at(2024, 1, 5, 20), Some(200), true))?;
    store.upsert_shift(shift("feb", "alice", at(2024, 2, 5, 20), Some(450), true))?;

    let sprint = tracker
        .create_sprint(SprintId::new("s"), &alice, at(2024, 1, 1, 0), Decimal::from(400))
        .await?;
    assert_eq!(sprint.shift_ids.len(), 1);

    let edited = tracker
        .edit_sprint(
            &sprint.id,
            SprintEdit {
                start: Some(at(2024, 2, 1, 13)),
                goal: None,
            },
        )
        .await?;
    assert_eq!(edited.start, at(2024, 2, 1, 0));
    assert_eq!(edited.end, at(2024, 2, 15, 0));
    assert_eq!(edited.goal, Decimal::from(400));
    assert_eq!(
        edited.shift_ids,
        [ShiftId::new("feb")].into_iter().collect::<BTreeSet<_>>()
    );

    assert!(tracker.close_expired(&alice, at(2024, 2, 10, 0)).await?.is_none());
    let closed = tracker
        .close_expired(&alice, at(2024, 2, 16, 0))
        .await?
        .expect("expired sprint");
    assert!(closed.is_completed);
    assert!(closed.goal_met);

    let result = tracker
        .edit_sprint(
            &sprint.id,
            SprintEdit {
                goal: Some(Decimal::from(5000)),
                ..SprintEdit::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AnalyticsError::SprintCompleted(_))));

    let stored = store.get_sprint(&sprint.id).await?.expect("sprint");
    assert!(stored.goal_met);
    assert_eq!(stored.goal, Decimal::from(400));

    println!("✓ Sprint lifecycle test passed");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_shift_changes_are_not_lost() -> anyhow::Result<()> {
    let analytics = GigAnalytics::new(MemoryStore::new());
    let store = analytics.store();
    let tracker = analytics.sprints();
    let alice = owner("alice");

    tracker
        .create_sprint(SprintId::new("s"), &alice, at(2024, 6, 1, 0), Decimal::from(100))
        .await?;

    let shifts: Vec<Shift> = (1..=5)
        .map(|day| shift(&format!("s{}", day), "alice", at(2024, 6, day, 20), Some(50), true))
        .collect();
    for s in &shifts {
        store.upsert_shift(s.clone())?;
    }

    store.inject_conflicts(2)?;
    let changes: Vec<ShiftChange> = shifts.iter().cloned().map(ShiftChange::Upserted).collect();
    let results =
        futures::future::join_all(changes.iter().map(|c| tracker.apply_shift_change(&alice, c))).await;
    for result in results {
        result?;
    }

    let sprint = store.get_sprint(&SprintId::new("s")).await?.expect("sprint");
    assert_eq!(sprint.shift_ids.len(), 5);

    println!("✓ Concurrent shift changes test passed");
    Ok(())
}

#[tokio::test]
async fn test_retry_budget_exhaustion_is_retryable() -> anyhow::Result<()> {
    let config = AnalyticsConfig::from_json_str(r#"{"max_sprint_update_attempts": 2}"#)?;
    let analytics = GigAnalytics::with_config(MemoryStore::new(), config)?;
    let store = analytics.store();
    let alice = owner("alice");

    analytics
        .sprints()
        .create_sprint(SprintId::new("s"), &alice, at(2024, 6, 1, 0), Decimal::from(100))
        .await?;
    store.upsert_shift(shift("late-add", "alice", at(2024, 6, 3, 20), Some(50), true))?;

    store.inject_conflicts(2)?;
    let err = analytics
        .recompute_sprint_shift_set(&SprintId::new("s"))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        AnalyticsError::ConcurrentSprintUpdate { attempts: 2, .. }
    ));

    let ids = analytics.recompute_sprint_shift_set(&SprintId::new("s")).await?;
    assert_eq!(ids, vec![ShiftId::new("late-add")]);

    println!("✓ Retry budget test passed");
    Ok(())
}

/// Returns every stored expense regardless of the owner asked for.
struct LeakyStore {
    inner: MemoryStore,
    everyone: Vec<MonetaryRecord>,
}

impl RecordStore for LeakyStore {
    fn list_income_records(
        &self,
        owner: &OwnerId,
        window: Window,
    ) -> impl Future<Output = StoreResult<Vec<MonetaryRecord>>> + Send {
        self.inner.list_income_records(owner, window)
    }

    fn list_expense_records(
        &self,
        _owner: &OwnerId,
        _window: Window,
    ) -> impl Future<Output = StoreResult<Vec<MonetaryRecord>>> + Send {
        futures::future::ready(Ok(self.everyone.clone()))
    }

    fn list_shifts(
        &self,
        owner: &OwnerId,
        filter: &ShiftFilter,
    ) -> impl Future<Output = StoreResult<Vec<Shift>>> + Send {
        self.inner.list_shifts(owner, filter)
    }

    fn get_sprint(
        &self,
        sprint_id: &SprintId,
    ) -> impl Future<Output = StoreResult<Option<Sprint>>> + Send {
        self.inner.get_sprint(sprint_id)
    }

    fn active_sprint(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = StoreResult<Option<Sprint>>> + Send {
        self.inner.active_sprint(owner)
    }

    fn save_sprint(&self, sprint: Sprint) -> impl Future<Output = StoreResult<Sprint>> + Send {
        self.inner.save_sprint(sprint)
    }

    fn update_sprint_shift_set(
        &self,
        sprint_id: &SprintId,
        expected_version: u64,
        add: &[ShiftId],
        remove: &[ShiftId],
    ) -> impl Future<Output = StoreResult<Sprint>> + Send {
        self.inner
            .update_sprint_shift_set(sprint_id, expected_version, add, remove)
    }
}

#[tokio::test]
async fn test_owner_isolation() -> anyhow::Result<()> {
    let now = at(2024, 3, 20, 12);

    let analytics = GigAnalytics::new(MemoryStore::new());
    analytics
        .store()
        .insert_expense(record("mine", "alice", at(2024, 3, 18, 9), 10, "fuel"))?;
    analytics
        .store()
        .insert_expense(record("theirs", "bob", at(2024, 3, 18, 9), 999, "fuel"))?;
    let dashboard = analytics.expense_dashboard(&owner("alice"), now).await?;
    assert_eq!(dashboard.ytd.standalone, Decimal::from(10));

    let leaky = GigAnalytics::new(LeakyStore {
        inner: MemoryStore::new(),
        everyone: vec![
            record("mine", "alice", at(2024, 3, 18, 9), 10, "fuel"),
            record("theirs", "bob", at(2024, 3, 18, 9), 999, "fuel"),
        ],
    });
    let result = leaky.expense_dashboard(&owner("alice"), now).await;
    match result {
        Err(AnalyticsError::OwnerScopeViolation { expected, found }) => {
            assert_eq!(expected, "alice");
            assert_eq!(found, "bob");
        }
        other => panic!("expected owner scope violation, got {:?}", other.map(|_| ())),
    }

    let blank: std::result::Result<OwnerId, _> = serde_json::from_str::<OwnerId>("\"\"");
    assert!(blank.is_err());

    println!("✓ Owner isolation test passed");
    Ok(())
}

#[test]
fn test_schema_generation() {
    let config_schema = AnalyticsConfig::schema_as_json().unwrap();
    assert!(config_schema.contains("max_sprint_update_attempts"));
    assert!(config_schema.contains("day_labels"));

    let income_schema = IncomeDashboard::schema_as_json().unwrap();
    assert!(income_schema.contains("averages"));
    assert!(income_schema.contains("percentOfGoal"));

    println!("✓ Schema generation test passed");
}
