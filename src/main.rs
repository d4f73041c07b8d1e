use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

use crossload::adjustment::ChoiceOutcome;
use crossload::apply::apply_edits;
use crossload::config::EngineConfig;
use crossload::library::StandardLibrary;
use crossload::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use crossload::models::{ActivityInput, AthleteContext, GoalRace, PlannedRun, Severity};
use crossload::suggestion::{build_suggestion, SuggestionPayload};

/// crossload - Cross-training load and plan adjustment CLI
///
/// Converts any logged activity into running-equivalent training load and
/// proposes budgeted adjustments to the week's running plan.
#[derive(Parser)]
#[command(name = "crossload")]
#[command(version = "0.1.0")]
#[command(about = "Cross-training load and plan adjustment CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the universal load of one activity
    Load {
        /// Activity file (JSON)
        #[arg(short, long)]
        activity: PathBuf,

        /// Goal race (marathon, half, 10k, 5k)
        #[arg(short, long, default_value = "marathon")]
        goal: String,
    },

    /// Suggest plan adjustments for one activity against a weekly plan
    Suggest {
        /// Weekly plan file (JSON array of runs)
        #[arg(short, long)]
        plan: PathBuf,

        /// Activity file (JSON)
        #[arg(short, long)]
        activity: PathBuf,

        /// Goal race (marathon, half, 10k, 5k)
        #[arg(short, long, default_value = "marathon")]
        goal: String,

        /// Returning-from-injury mode (long runs become replaceable)
        #[arg(long)]
        injury: bool,

        /// Emit the raw suggestion payload as JSON
        #[arg(long)]
        json: bool,

        /// Write the payload to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a chosen outcome from a saved suggestion to the plan
    Apply {
        /// Weekly plan file (JSON array of runs)
        #[arg(short, long)]
        plan: PathBuf,

        /// Suggestion payload file produced by `suggest --json`
        #[arg(short, long)]
        suggestion: PathBuf,

        /// Which outcome to apply (keep, conservative, recommended)
        #[arg(short = 'C', long, default_value = "recommended")]
        choice: String,

        /// Where to write the adjusted plan (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configure engine settings
    Config {
        /// Write the default configuration to the standard location
        #[arg(long)]
        init: bool,

        /// Print the active configuration path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        format: cli.log_format,
        include_spans: false,
    })?;

    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::load_or_default(),
    };

    match cli.command {
        Commands::Load { activity, goal } => cmd_load(&config, &activity, &goal),
        Commands::Suggest {
            plan,
            activity,
            goal,
            injury,
            json,
            output,
        } => cmd_suggest(&config, &plan, &activity, &goal, injury, json, output),
        Commands::Apply {
            plan,
            suggestion,
            choice,
            output,
        } => cmd_apply(&plan, &suggestion, &choice, output),
        Commands::Config { init, path } => cmd_config(&config, init, path),
    }
}

fn parse_goal(label: &str) -> Result<GoalRace> {
    match label.to_lowercase().as_str() {
        "marathon" => Ok(GoalRace::Marathon),
        "half" | "half_marathon" | "half-marathon" => Ok(GoalRace::HalfMarathon),
        "10k" | "tenk" => Ok(GoalRace::TenK),
        "5k" | "fivek" => Ok(GoalRace::FiveK),
        other => Err(anyhow!(
            "Unknown goal '{}' (expected marathon, half, 10k or 5k)",
            other
        )),
    }
}

fn read_activity(path: &PathBuf) -> Result<ActivityInput> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading activity file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing activity file {}", path.display()))
}

fn read_plan(path: &PathBuf) -> Result<Vec<PlannedRun>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading plan file {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing plan file {}", path.display()))
}

fn cmd_load(config: &EngineConfig, activity_path: &PathBuf, goal: &str) -> Result<()> {
    let activity = read_activity(activity_path)?;
    let goal = parse_goal(goal)?;
    let load = crossload::compute_universal_load(
        &activity,
        goal,
        &config.load,
        &config.credit,
    );

    println!(
        "{} {} for {:.0} min",
        "Activity:".bold(),
        activity.sport.label(),
        activity.duration_min
    );
    println!(
        "  tier {} (confidence {:.0}%)",
        load.tier.description(),
        load.confidence * 100.0
    );
    println!(
        "  base load {:.1}  fatigue cost {:.1}  replacement credit {:.1}",
        load.base_load, load.fatigue_cost_load, load.run_replacement_credit
    );
    println!("  equivalent easy running: {:.1} km", load.equivalent_easy_km);
    for note in &load.explanations {
        println!("  {}", note.dimmed());
    }
    Ok(())
}

fn cmd_suggest(
    config: &EngineConfig,
    plan_path: &PathBuf,
    activity_path: &PathBuf,
    goal: &str,
    injury: bool,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let plan = read_plan(plan_path)?;
    let activity = read_activity(activity_path)?;
    let context = AthleteContext {
        goal: parse_goal(goal)?,
        injury_mode: injury,
    };

    let payload = build_suggestion(&plan, &activity, &context, config);

    if json {
        let text = serde_json::to_string_pretty(&payload)?;
        match output {
            Some(path) => fs::write(&path, text)
                .with_context(|| format!("writing payload to {}", path.display()))?,
            None => println!("{}", text),
        }
        return Ok(());
    }

    print_payload(&payload, &activity);
    Ok(())
}

#[derive(Tabled)]
struct EditRow {
    #[tabled(rename = "Run")]
    run: String,
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Load spent")]
    load: String,
}

fn print_payload(payload: &SuggestionPayload, activity: &ActivityInput) {
    let severity = match payload.severity {
        Severity::Light => "light".green(),
        Severity::Heavy => "heavy".yellow(),
        Severity::Extreme => "EXTREME".red().bold(),
    };
    println!(
        "{} {} ({:.0} min) was a {} session for this week",
        "Session:".bold(),
        activity.sport.label(),
        activity.duration_min,
        severity
    );
    println!(
        "  fatigue cost {:.1}, replacement credit {:.1}, about {:.1} km of easy running",
        payload.load.fatigue_cost_load,
        payload.load.run_replacement_credit,
        payload.load.equivalent_easy_km
    );

    for warning in &payload.warnings {
        println!("  {} {}", "!".yellow().bold(), warning);
    }

    for outcome in [&payload.keep, &payload.conservative, &payload.recommended] {
        println!();
        print_outcome(outcome);
    }
}

fn print_outcome(outcome: &ChoiceOutcome) {
    println!("{} {}", outcome.label.to_uppercase().bold(), outcome.summary);
    if outcome.edits.is_empty() {
        return;
    }
    let rows: Vec<EditRow> = outcome
        .edits
        .iter()
        .map(|edit| EditRow {
            run: edit.run_id.clone(),
            day: edit.day.to_string(),
            change: edit.rationale.clone(),
            load: format!("{:.1}", edit.load_reduction),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

fn cmd_apply(
    plan_path: &PathBuf,
    suggestion_path: &PathBuf,
    choice: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let plan = read_plan(plan_path)?;
    let contents = fs::read_to_string(suggestion_path)
        .with_context(|| format!("reading suggestion file {}", suggestion_path.display()))?;
    let payload: SuggestionPayload = serde_json::from_str(&contents)
        .with_context(|| format!("parsing suggestion file {}", suggestion_path.display()))?;

    let outcome = payload
        .outcome(choice)
        .ok_or_else(|| anyhow!("Unknown choice '{}' (keep, conservative, recommended)", choice))?;

    let library = StandardLibrary::new();
    let adjusted = apply_edits(&plan, &outcome.edits, &payload.activity_sport, &library)
        .map_err(|e| anyhow!(e.user_message()))?;

    let text = serde_json::to_string_pretty(&adjusted)?;
    match output {
        Some(path) => {
            fs::write(&path, text)
                .with_context(|| format!("writing adjusted plan to {}", path.display()))?;
            println!(
                "{} applied '{}' ({} edits) -> {}",
                "OK".green().bold(),
                choice,
                outcome.edits.len(),
                path.display()
            );
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn cmd_config(config: &EngineConfig, init: bool, path: bool) -> Result<()> {
    if path {
        match EngineConfig::default_path() {
            Some(p) => println!("{}", p.display()),
            None => println!("(no standard config directory on this platform)"),
        }
    }
    if init {
        let target = EngineConfig::default_path()
            .ok_or_else(|| anyhow!("No standard config directory on this platform"))?;
        config.save_to_file(&target)?;
        println!("{} wrote {}", "OK".green().bold(), target.display());
    }
    if !init && !path {
        println!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}
