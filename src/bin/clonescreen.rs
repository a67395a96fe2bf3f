//! CloneScreen CLI: run a screening campaign and print the results
//!
//! Commands:
//!   clonescreen run     run a campaign and print the selection
//!   clonescreen config  write the reference configuration as JSON
//!   clonescreen help    show usage

use clonescreen_core::{Campaign, CampaignReport, ScreenError, ScreeningConfig};
use std::env;
use std::process;

fn print_usage() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║        CloneScreen v0.1 : Cell Line Screening Campaign       ║
║        Seed → Feed & Sample → Harvest & Analyze              ║
╚══════════════════════════════════════════════════════════════╝

Usage: clonescreen <command> [options]

Commands:
  run     [options]          Run a screening campaign
  config  [path]             Write the reference config (default: clonescreen.json)
  help                       Show this message

Options for run:
  --config <path>            Load configuration from a JSON file
  --seed <n>                 Fix the random seed
  --clones <n>               Number of clones to screen (default 96)
  --top <n>                  Number of clones to advance (default 10)
  --out <path>               Save the full report as JSON

Examples:
  clonescreen run --seed 42
  clonescreen run --clones 384 --top 24 --out campaign.json
  clonescreen config my-screen.json
"#
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "config" => cmd_config(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("  Error: {}", e);
        process::exit(1);
    }
}

/// Value following `flag`, if present
fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], name: &str) -> Result<Option<T>, ScreenError> {
    match flag(args, name) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            ScreenError::InvalidInput(format!("{name} expects a number, got '{raw}'"))
        }),
    }
}

fn cmd_run(args: &[String]) -> Result<(), ScreenError> {
    let mut config = match flag(args, "--config") {
        Some(path) => ScreeningConfig::load(path)?,
        None => ScreeningConfig::default(),
    };
    if let Some(seed) = parse_flag(args, "--seed")? {
        config.seed = Some(seed);
    }
    if let Some(clones) = parse_flag(args, "--clones")? {
        config.population = clones;
    }
    if let Some(top) = parse_flag(args, "--top")? {
        config.top_k = top;
    }

    let campaign = Campaign::new(config)?;
    let report = campaign.run()?;
    print_report(&report, campaign.config());

    if let Some(path) = flag(args, "--out") {
        report.save(path)?;
        println!("\n  Report saved to {}", path);
    }
    Ok(())
}

fn cmd_config(args: &[String]) -> Result<(), ScreenError> {
    let path = args.first().map(String::as_str).unwrap_or("clonescreen.json");
    ScreeningConfig::default().save(path)?;
    println!("  Reference configuration written to {}", path);
    Ok(())
}

fn print_report(report: &CampaignReport, config: &ScreeningConfig) {
    println!("\n{}", "=".repeat(78));
    println!("CELL LINE SCREENING CAMPAIGN {}", report.campaign_id);
    println!("{}", "=".repeat(78));
    println!(
        "  Parent line: {} | Clones: {} | Seed: {}",
        report.parent_line,
        report.scored.len(),
        report.seed.map(|s| s.to_string()).unwrap_or_else(|| "-".into())
    );

    for (checkpoint, scheduled) in report.checkpoints.iter().zip(&report.schedule) {
        println!("\nDAY {}: {} ({})", checkpoint.day, checkpoint.step, scheduled.date);
        println!("{}", "-".repeat(78));
        println!(
            "  Mean VCD: {:.2e} cells/mL | Max VCD: {:.2e} cells/mL",
            checkpoint.mean_density, checkpoint.max_density
        );
        println!(
            "  Mean titer: {:.2} g/L | Max titer: {:.2} g/L | Mean viability: {:.1}%",
            checkpoint.mean_titer,
            checkpoint.max_titer,
            checkpoint.mean_viability * 100.0
        );
        println!(
            "  High producers (>{} g/L): {} | Stable clones: {}",
            config.high_producer_titer, checkpoint.high_producers, checkpoint.stable_clones
        );
    }

    println!("\nTOP {} CLONE SELECTION", report.selected.len());
    println!("{}", "-".repeat(78));
    println!(
        "  {:<4} {:<10} {:>7} {:>8} {:>8} {:>7} {:>6} {:>9} {:>6} {:>7}",
        "Rank", "Clone", "Titer", "Viab.%", "VCD e6", "Growth", "Stable", "Glyco", "Aggr%", "Score"
    );
    for (rank, s) in report.selected.iter().enumerate() {
        println!(
            "  {:<4} {:<10} {:>7.2} {:>8.1} {:>8.2} {:>7.4} {:>6} {:>9} {:>6.1} {:>7.3}",
            rank + 1,
            s.label,
            s.titer,
            s.viability * 100.0,
            s.density / 1e6,
            s.growth_rate,
            if s.stable { "Yes" } else { "No" },
            s.glycosylation.name(),
            s.aggregation * 100.0,
            s.score,
        );
    }

    let summary = report.summary();
    println!("\nCAMPAIGN SUMMARY");
    println!("{}", "-".repeat(78));
    println!("  Clones screened: {}", summary.clones_screened);
    println!("  Clones advanced: {}", summary.clones_advanced);
    println!("  Success rate:    {:.1}%", summary.success_rate);
    println!("  Best titer:      {:.2} g/L", summary.best_titer);
    println!(
        "  Best clone:      {}",
        summary.best_clone.as_deref().unwrap_or("-")
    );
    match report.fingerprint() {
        Ok(fp) => println!("  Fingerprint:     {}", fp),
        Err(e) => eprintln!("  Fingerprint unavailable: {}", e),
    }
}
