//! Staffing loop against a synthetic weekday profile
//!
//! Starts from a thin schedule, evaluates it, and adds one with-terminal
//! collector wherever the evaluator reports a violation until the whole
//! day meets the service standard.
//!
//! Run with `RUST_LOG=info cargo run --bin station_main` to see per-run
//! reports.

use fare_station_sim::{
    evaluate_schedule, ConcurrencyMode, DemandTable, FeedbackVector, SimulationConfig,
    SimulationError, StaffSchedule,
};

const BLOCKS: usize = 68;
const MAX_ITERATIONS: usize = 200;

/// Morning and evening rush on top of a steady base load
fn weekday_demand() -> Result<DemandTable, SimulationError> {
    let profile = |block: usize, base: u32, peak: u32| -> u32 {
        let morning = (block as i64 - 8).unsigned_abs() <= 4;
        let evening = (block as i64 - 48).unsigned_abs() <= 6;
        if morning || evening {
            peak
        } else {
            base
        }
    };
    let buy = (0..BLOCKS).map(|b| profile(b, 60, 180)).collect();
    let reload = (0..BLOCKS).map(|b| profile(b, 30, 110)).collect();
    DemandTable::new(buy, reload)
}

fn main() -> Result<(), SimulationError> {
    env_logger::init();
    println!("🚇 Starting fare station staffing loop 🚇");

    let demand = weekday_demand()?;
    let mut with_terminal = vec![1u32; BLOCKS];
    let without_terminal = vec![1u32; BLOCKS];
    let mut feedback = FeedbackVector::new();

    let config = SimulationConfig::new()
        .with_seed(42)
        .with_repetitions(4)
        .with_concurrency(ConcurrencyMode::Rayon);

    for iteration in 1..=MAX_ITERATIONS {
        let schedule = StaffSchedule::new(with_terminal.clone(), without_terminal.clone())?;
        let completion =
            evaluate_schedule(schedule, demand.clone(), &mut feedback, config.clone())?;

        match completion.violation {
            None => {
                println!("✅ Schedule meets the standard after {} iterations", iteration);
                break;
            }
            Some(violation) => {
                println!(
                    "Iteration {}: block {} averaged {:.2} with {} on shift, raising minimum to {}",
                    iteration,
                    violation.block,
                    violation.rolling_average,
                    violation.on_shift,
                    violation.revised_minimum
                );
                with_terminal[violation.block - 1] += 1;
            }
        }
        if iteration == MAX_ITERATIONS {
            println!("⚠️  Gave up after {} iterations", MAX_ITERATIONS);
        }
    }

    println!("\n📊 Final with-terminal staffing by block:");
    for (block, count) in with_terminal.iter().enumerate() {
        print!("{:>3}", count);
        if (block + 1) % 17 == 0 {
            println!();
        }
    }
    println!("\n📋 Feedback entries: {}", feedback.len());
    for (block, minimum) in feedback.iter() {
        println!("   block {:>2}: at least {}", block, minimum);
    }
    Ok(())
}
