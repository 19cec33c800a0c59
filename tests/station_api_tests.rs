use fare_station_sim::{
    evaluate_schedule, ConcurrencyMode, DemandTable, FeedbackVector, SimulationConfig,
    SimulationError, StaffSchedule, StationParameters, StationSimulation,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn day(blocks: usize) -> SimulationConfig {
    SimulationConfig::new().with_seed(20240601).with_parameters(StationParameters {
        blocks,
        ..StationParameters::default()
    })
}

/// Generous staffing against light demand for the whole operating day
fn quiet_day() -> (StaffSchedule, DemandTable) {
    let schedule = StaffSchedule::new(vec![3; 68], vec![2; 68]).unwrap();
    let demand = DemandTable::new(vec![30; 68], vec![20; 68]).unwrap();
    (schedule, demand)
}

#[test]
fn test_convergence_leaves_feedback_untouched() {
    init_logging();
    let (schedule, demand) = quiet_day();
    let mut feedback: FeedbackVector = vec![(10, 4)].into_iter().collect();

    let completion = evaluate_schedule(schedule, demand, &mut feedback, day(68)).unwrap();

    assert!(completion.complete);
    assert!(completion.violation.is_none());
    assert_eq!(feedback.iter().collect::<Vec<_>>(), vec![(10, 4)]);
}

#[test]
fn test_overloaded_block_raises_minimum_staff() {
    init_logging();
    // One collector facing one customer per second from the opening block
    let schedule = StaffSchedule::new(vec![1, 2, 2, 2], vec![0, 1, 1, 1]).unwrap();
    let demand = DemandTable::new(vec![900, 10, 10, 10], vec![0, 0, 0, 0]).unwrap();
    let mut feedback = FeedbackVector::new();

    let completion = evaluate_schedule(schedule, demand, &mut feedback, day(4)).unwrap();

    assert!(!completion.complete);
    let violation = completion.violation.unwrap();
    assert_eq!(violation.block, 1);
    assert_eq!(violation.on_shift, 1);
    assert_eq!(violation.revised_minimum, 2);
    assert!(violation.rolling_average >= 4.0);
    assert_eq!(feedback.iter().collect::<Vec<_>>(), vec![(1, 2)]);
}

#[test]
fn test_same_seed_gives_identical_feedback() {
    init_logging();
    let schedule = StaffSchedule::new(vec![1, 1, 2, 1, 1, 1], vec![1, 0, 1, 1, 0, 1]).unwrap();
    let demand = DemandTable::new(
        vec![200, 150, 400, 250, 120, 300],
        vec![80, 90, 100, 60, 50, 70],
    )
    .unwrap();
    let config = day(6).with_repetitions(3);

    let mut first = FeedbackVector::new();
    let mut second = FeedbackVector::new();
    let a =
        evaluate_schedule(schedule.clone(), demand.clone(), &mut first, config.clone()).unwrap();
    let b = evaluate_schedule(schedule, demand, &mut second, config).unwrap();

    assert_eq!(a, b);
    assert_eq!(first, second);
}

#[test]
fn test_parallel_repetitions_match_sequential() {
    init_logging();
    let schedule = StaffSchedule::new(vec![2, 1, 2], vec![1, 1, 0]).unwrap();
    let demand = DemandTable::new(vec![300, 200, 350], vec![100, 80, 120]).unwrap();

    let sequential =
        StationSimulation::new(schedule.clone(), demand.clone(), day(3).with_repetitions(6))
            .unwrap()
            .run()
            .unwrap();
    let parallel = StationSimulation::new(
        schedule,
        demand,
        day(3)
            .with_repetitions(6)
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(3),
    )
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_external_tables_drive_a_full_day() {
    init_logging();
    // Categories 1 and 3 (static and mobile with terminal) fold together
    let staff: Vec<((u32, usize), f64)> = (1..=68)
        .flat_map(|block| vec![((1, block), 2.0), ((3, block), 1.0), ((2, block), 1.0)])
        .collect();
    let demand: Vec<((u32, usize), f64)> = (1..=68)
        .flat_map(|block| vec![((1, block), 40.0), ((2, block), 25.0)])
        .collect();

    let schedule = StaffSchedule::from_external(staff, 68).unwrap();
    let demand = DemandTable::from_external(demand, 68).unwrap();
    let sim = StationSimulation::new(schedule, demand, day(68)).unwrap();
    let summary = sim.run().unwrap();

    let report = &summary.runs[0];
    assert_eq!(report.reconciliations, 68);
    assert_eq!(report.samples, 68 * 15);
    assert_eq!(summary.rolling_averages.len(), 68);
    assert!(summary.rolling_averages.iter().all(|avg| *avg >= 0.0 && *avg < 4.0));
}

#[test]
fn test_unstaffed_reload_demand_fails_fast() {
    init_logging();
    let schedule = StaffSchedule::new(vec![1, 0], vec![1, 1]).unwrap();
    let demand = DemandTable::new(vec![10, 10], vec![10, 10]).unwrap();
    let mut feedback = FeedbackVector::new();

    let err = evaluate_schedule(schedule, demand, &mut feedback, day(2)).unwrap_err();

    assert!(err.is_configuration_error());
    assert!(matches!(err, SimulationError::UnstaffedDemand { block: 1, .. }));
    assert!(feedback.is_empty());
}

#[test]
fn test_staff_leaving_mid_day_is_tracked() {
    init_logging();
    let schedule = StaffSchedule::new(vec![3, 1, 1, 3], vec![2, 0, 1, 2]).unwrap();
    let demand = DemandTable::new(vec![400, 100, 100, 400], vec![200, 50, 50, 200]).unwrap();
    let sim = StationSimulation::new(schedule, demand, day(4)).unwrap();

    let report = sim.run_once(99).unwrap();

    // Two with-terminal and two without-terminal collectors leave after block 0
    assert!(report.removals >= 4);
    for kind in 0..2 {
        assert!(report.served[kind] + report.abandoned[kind] <= report.arrivals[kind]);
    }
}

#[test]
fn test_accepted_schedule_never_aborts_at_block_change() {
    init_logging();
    // Reload demand stops exactly when the last terminal collector leaves
    let schedule = StaffSchedule::new(vec![1, 0], vec![0, 1]).unwrap();
    let demand = DemandTable::new(vec![0, 10], vec![30, 0]).unwrap();
    let sim = StationSimulation::new(schedule, demand, day(2)).unwrap();

    for seed in 0..100 {
        let report = sim.run_once(seed).unwrap();
        assert!(report.arrivals[1] > 0, "seed {}", seed);
    }
}
