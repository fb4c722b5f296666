use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lineup_planner::{
    classify_at, execute_stage3, parse_context_file, AnthropicClient, AnthropicConfig,
    LineupPlanner, PlannerConfig, SegmentOracle, Stage3Config, StatusCodeTable,
    UnavailableOracle,
};

#[derive(Parser)]
#[command(name = "lineup-planner")]
#[command(author, version, about = "Sports podcast episode lineup planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan an episode lineup from an enriched event context
    Plan {
        /// Input context file (JSON object)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the lineup document (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the production rundown (text)
        #[arg(long)]
        rundown: Option<PathBuf>,

        /// Episode length in minutes
        #[arg(short, long, default_value = "10")]
        minutes: u32,

        /// Oracle timeout in seconds
        #[arg(long)]
        oracle_timeout_secs: Option<u64>,

        /// Skip the content oracle and plan from canonical segments
        #[arg(long)]
        offline: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report the phase of the event in a context file
    Classify {
        /// Input context file (JSON object)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            input,
            output,
            rundown,
            minutes,
            oracle_timeout_secs,
            offline,
            verbose,
        } => {
            setup_logging(verbose);
            plan_episode(input, output, rundown, minutes, oracle_timeout_secs, offline).await
        }
        Commands::Classify { input, verbose } => {
            setup_logging(verbose);
            classify_event(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn plan_episode(
    input: PathBuf,
    output: PathBuf,
    rundown: Option<PathBuf>,
    minutes: u32,
    oracle_timeout_secs: Option<u64>,
    offline: bool,
) -> Result<()> {
    info!("Loading context from {:?}", input);
    let context = parse_context_file(&input).context("Failed to parse input context")?;

    let oracle: Box<dyn SegmentOracle> = if offline {
        info!("Offline mode: planning from canonical segments");
        Box::new(UnavailableOracle)
    } else {
        let config = AnthropicConfig::from_env()?;
        Box::new(AnthropicClient::new(config))
    };

    let config = PlannerConfig {
        oracle_timeout: oracle_timeout_secs.map(Duration::from_secs),
        ..Default::default()
    };
    let planner = LineupPlanner::with_config(oracle, config);

    let lineup = planner
        .plan(&context, minutes)
        .await
        .context("Failed to plan lineup")?;

    execute_stage3(
        &lineup,
        Some(output.as_path()),
        rundown.as_deref(),
        &Stage3Config::default(),
    )?;

    println!();
    println!("Lineup Summary");
    println!("==============");
    println!("Title: {}", lineup.episode_title);
    println!("Phase: {}", lineup.phase.display_name());
    println!("Source: {:?}", lineup.candidate_source);
    println!("Priority score: {:.1}", lineup.priority_score);
    println!("Segments:");
    for segment in &lineup.segments {
        println!(
            "  {:>4}s  tone {}  {}",
            segment.duration_seconds, segment.tone_level, segment.topic
        );
    }
    println!("Total: {}s", lineup.total_seconds());

    Ok(())
}

fn classify_event(input: PathBuf) -> Result<()> {
    info!("Classifying event from {:?}", input);
    let context = parse_context_file(&input).context("Failed to parse input context")?;
    let event = context.snapshot()?;

    let (phase, basis) = classify_at(&event, &StatusCodeTable::default(), chrono::Utc::now());

    println!("Event Classification");
    println!("====================");
    println!("Matchup: {}", event.matchup());
    if let Some(competition) = &event.competition {
        println!("Competition: {}", competition);
    }
    println!("Status code: {}", event.status_code);
    println!("Scores: {:?}", event.scores);
    if let Some(start) = &event.start_time {
        println!("Start time: {}", start);
    }
    println!();
    println!("Phase: {}", phase.display_name());
    println!("Decided by: {:?}", basis);

    Ok(())
}
