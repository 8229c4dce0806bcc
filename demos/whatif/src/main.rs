//! whatif — headless runner for the procure_twin workspace.
//!
//! Phase 1 replays the historical event log through the digital twin, picks
//! the most-blocked activity (or `--activity`), adds one hire to its pool and
//! compares the two runs, plus any `--overrides` file as a third scenario.
//! Phase 2 pits a greedy backlog policy against a
//! random one on the ticket environment, baseline and enriched.
//!
//! A failing phase prints its error and the next one still runs.
//!
//! ```text
//! RUST_LOG=info cargo run -p whatif -- --log data/sap_event_log.csv --max-cases 500
//! ```

mod args;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use pt_core::{EnvConfig, TwinConfig};
use pt_env::{
    Enrichment, Environment, Evaluation, GreedyPolicy, Policy, RandomPolicy, TicketEnv,
    load_tickets_csv,
};
use pt_output::{CsvWriter, OutputWriter, TwinOutputObserver, write_summary};
use pt_pool::PoolOverrides;
use pt_sim::{DigitalTwin, RunSummary, Scenario, ScenarioResult, run_scenarios};

use args::Args;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse(std::env::args().skip(1))?;

    println!("=== whatif — procure_twin ===");
    println!("Seed: {}  |  Log: {}  |  Tickets: {}", args.seed, args.log.display(), args.tickets.display());
    println!();

    if let Err(e) = what_if(&args) {
        eprintln!("what-if phase failed: {e:#}");
    }
    println!();
    if let Err(e) = showdown(&args) {
        eprintln!("policy showdown failed: {e:#}");
    }
    Ok(())
}

// ── Phase 1: staffing what-if ─────────────────────────────────────────────────

fn what_if(args: &Args) -> Result<()> {
    let config = TwinConfig { seed: args.seed, ..TwinConfig::default() };
    let max_cases = args.max_cases.unwrap_or(config.max_cases);

    let mut twin = DigitalTwin::load(&args.log, config.clone())?;
    if twin.store().is_empty() {
        println!("No cases in {}; nothing to simulate.", args.log.display());
        return Ok(());
    }
    println!(
        "Trace store: {} cases, {} activities, {} resources",
        twin.store().case_count(),
        twin.store().activities().len(),
        twin.store().resources().len()
    );

    let t0 = Instant::now();
    let baseline = observed_run(&mut twin, "baseline", max_cases, args.out.as_deref())?;
    println!("Baseline run in {:.3} s", t0.elapsed().as_secs_f64());

    let Some(activity) = args.activity.clone().or_else(|| most_blocked(&baseline)) else {
        println!("No activity ever waited for a resource; no what-if to run.");
        return Ok(());
    };
    let Some(activity_id) = twin.store().activities().get(&activity) else {
        anyhow::bail!("activity {activity:?} does not occur in the event log");
    };

    let mut pool: Vec<String> =
        twin.pool().eligible_names(activity_id).into_iter().map(str::to_owned).collect();
    pool.push(args.hire.clone());
    println!("What-if: {activity:?} pool becomes {pool:?}");
    let overrides = PoolOverrides::new().with(&activity, pool);

    let mut scenarios = vec![
        Scenario::baseline("baseline"),
        Scenario::with_overrides(&format!("hire_{}", args.hire), overrides.clone()),
    ];
    if let Some(path) = &args.overrides {
        let from_file = PoolOverrides::from_json_path(path)
            .with_context(|| format!("reading overrides {}", path.display()))?;
        println!("Overrides from {}: {} activities", path.display(), from_file.len());
        scenarios.push(Scenario::with_overrides("overrides", from_file));
    }
    let results = run_scenarios(&twin.shared_store(), &config, &scenarios, max_cases)?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    println!();
    print_table(&results, &activity);

    if let Some(out) = args.out.as_deref() {
        write_scenarios(out, &results)?;
        twin.configure(Some(&overrides));
        observed_run(&mut twin, "what_if", max_cases, Some(out))?;
    }
    Ok(())
}

fn print_table(results: &[ScenarioResult], activity: &str) {
    print!("{:<28}", "");
    for r in results {
        print!(" {:>12}", r.name);
    }
    println!();
    println!("{}", "-".repeat(28 + 13 * results.len()));
    let metrics: [(&str, fn(&RunSummary, &str) -> f64); 6] = [
        ("avg cycle time (h)", |s, _| s.avg_cycle_time_hours),
        ("avg blocked (h)", |s, _| s.avg_blocked_hours),
        ("activity blocked (h)", |s, a| s.blocked_hours_for(a)),
        ("throughput (cases/h)", |s, _| s.throughput_cases_per_hour),
        ("value processed", |s, _| s.value_processed),
        ("long waits", |s, _| s.long_waits as f64),
    ];
    for (label, metric) in metrics {
        print!("{label:<28}");
        for r in results {
            print!(" {:>12.2}", metric(&r.summary, activity));
        }
        println!();
    }
}

/// One labelled row per scenario in `out/scenarios/run_summaries.csv`.
fn write_scenarios(out: &Path, results: &[ScenarioResult]) -> Result<()> {
    let dir = out.join("scenarios");
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut writer = CsvWriter::new(&dir)?;
    for r in results {
        write_summary(&mut writer, &r.name, &r.summary)?;
    }
    writer.finish()?;
    println!("  wrote {}", dir.display());
    Ok(())
}

/// Run once, writing step events under `out/<label>/` when `out` is set.
fn observed_run(twin: &mut DigitalTwin, label: &str, max_cases: usize, out: Option<&Path>) -> Result<RunSummary> {
    let Some(out) = out else {
        return Ok(twin.run(max_cases));
    };
    let dir = out.join(label);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut obs = TwinOutputObserver::new(CsvWriter::new(&dir)?, label);
    let summary = twin.run_observed(max_cases, &mut obs);
    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }
    println!("  wrote {}", dir.display());
    Ok(summary)
}

fn most_blocked(summary: &RunSummary) -> Option<String> {
    summary
        .activity_blocked_hours
        .iter()
        .filter(|(_, h)| **h > 0.0)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(name, _)| name.clone())
}

// ── Phase 2: policy showdown ──────────────────────────────────────────────────

fn showdown(args: &Args) -> Result<()> {
    let pool = Arc::new(load_tickets_csv(&args.tickets)?);
    if pool.is_empty() {
        println!("Ticket pool is empty; skipping the showdown.");
        return Ok(());
    }
    let config = EnvConfig { seed: Some(args.seed), ..EnvConfig::default() };
    let enrichment = Arc::new(Enrichment::load_lenient(args.bottlenecks.as_deref(), args.embeddings.as_deref()));

    println!("Policy showdown: {} tickets, {} steps per policy", pool.len(), args.steps);
    println!("{:<10} {:<8} {:>10} {:>12} {:>14}", "Variant", "Policy", "Episodes", "Mean reward", "Value");
    println!("{}", "-".repeat(58));

    let baseline = TicketEnv::baseline(Arc::clone(&pool), config.clone())?;
    let enriched = TicketEnv::enriched(Arc::clone(&pool), enrichment, config.clone())?;
    for (variant, env) in [("baseline", baseline), ("enriched", enriched)] {
        let actions = env.action_count();
        let mut greedy = GreedyPolicy;
        let mut random = RandomPolicy::new(actions, Some(args.seed));
        print_eval(variant, "greedy", &play(env.clone(), &mut greedy, args.steps));
        print_eval(variant, "random", &play(env, &mut random, args.steps));
    }
    Ok(())
}

fn play<P: Policy>(mut env: TicketEnv, policy: &mut P, steps: usize) -> Evaluation {
    pt_env::evaluate(&mut env, policy, steps)
}

fn print_eval(variant: &str, policy: &str, eval: &Evaluation) {
    println!(
        "{:<10} {:<8} {:>10} {:>12.3} {:>14.2}",
        variant,
        policy,
        eval.episodes,
        eval.mean_reward(),
        eval.value_processed
    );
}
