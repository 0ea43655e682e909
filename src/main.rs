//! Command-line entry point: read the roster and history, plan a round,
//! print it, and optionally save it.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_grouping::config::RunConfig;
use u_grouping::render::{Format, Message};
use u_grouping::roster::{split_exclusions, Roster};
use u_grouping::round::plan_round;
use u_grouping::search::{SearchRequest, Strategy};
use u_grouping::similarity::Weighting;
use u_grouping::{store, GroupingResult};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Keep the best of a fixed number of candidates
    BestOf,
    /// Draw until the weighted history score is below --target
    UntilTarget,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Html,
}

/// Split a roster into small groups, avoiding repeat pairings and rotating leaders
#[derive(Parser, Debug)]
#[command(name = "u-grouping")]
#[command(about = "Generates the next round of small groups from a roster and past rounds")]
struct Args {
    /// Roster file with `name,email` lines
    #[arg(long, default_value = "include")]
    include: PathBuf,

    /// File of people to leave out, same format as --include
    #[arg(long, default_value = "exclude")]
    exclude: PathBuf,

    /// Emails to leave out of this round (repeatable, may be `;`-separated)
    #[arg(short = 'e', long = "exclude-email")]
    exclude_email: Vec<String>,

    /// Directory of previously saved rounds
    #[arg(long, default_value = "previous")]
    previous: PathBuf,

    /// Target group size
    #[arg(long, default_value_t = 4)]
    group_size: usize,

    /// Search policy
    #[arg(long, value_enum, default_value = "best-of")]
    strategy: StrategyArg,

    /// Candidates to draw for best-of search
    #[arg(long, default_value_t = 100_000)]
    attempts: usize,

    /// Weighted history score to get under for until-target search
    #[arg(long, default_value_t = 0.05)]
    target: f64,

    /// Accept repeats from the previous round if nothing better is found
    #[arg(long)]
    allow_imperfect: bool,

    /// Spread best-of attempts over all cores
    #[arg(long)]
    parallel: bool,

    /// Leadership metric: lead_fraction or lead_occasions
    #[arg(long, default_value = "lead_fraction")]
    leader_metric: String,

    /// Weighting for the similarity report: linear or quadratic
    #[arg(long, default_value = "linear")]
    weighting: String,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Give up target search after this many candidates
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Give up target search after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Candidates between progress lines during until-target search
    #[arg(long, default_value_t = 10_000)]
    progress_interval: u64,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: FormatArg,

    /// File with the greeting printed before the groups
    #[arg(long)]
    header: Option<PathBuf>,

    /// File with the closing note printed after the groups
    #[arg(long)]
    footer: Option<PathBuf>,

    /// Save the round into --previous
    #[arg(long)]
    save: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn run_config(&self) -> GroupingResult<RunConfig> {
        let strategy = match self.strategy {
            StrategyArg::BestOf => Strategy::BestOf {
                attempts: self.attempts,
                parallel: self.parallel,
            },
            StrategyArg::UntilTarget => Strategy::UntilTarget {
                target: self.target,
            },
        };
        let config = RunConfig {
            group_size: self.group_size,
            strategy,
            allow_imperfect: self.allow_imperfect,
            leader_metric: self.leader_metric.clone(),
            weighting: self.weighting.parse::<Weighting>()?,
            seed: self.seed,
            max_attempts: self.max_attempts,
            timeout: self.timeout_secs.map(Duration::from_secs),
            progress_interval: self.progress_interval,
            format: match self.format {
                FormatArg::Text => Format::Text,
                FormatArg::Html => Format::Html,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> GroupingResult<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = args.run_config()?;
    let message = Message::load(args.header.as_deref(), args.footer.as_deref())?;
    let excluded = split_exclusions(&args.exclude_email);
    let roster = Roster::load(&args.include, Some(args.exclude.as_path()), &excluded)?;
    let history = store::load_history_or_empty(&args.previous)?;
    info!(
        participants = roster.included.len(),
        excluded = roster.excluded.len(),
        history = history.len(),
        "inputs loaded"
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let request = SearchRequest::new(roster.participants(), config.group_size)
        .with_history(history)
        .with_allow_imperfect(config.allow_imperfect);
    let round = plan_round(
        &request,
        &config.strategy,
        &config.search_control(),
        &config.leader_adjuster()?,
        &mut rng,
    )?;

    println!("{}", message.render(&round, &roster.names(), config.format));

    if let Some(previous) = request.previous() {
        let stats = round.similarity_to(previous, config.weighting)?;
        println!();
        println!("Similarity to the round of {}:", previous.date);
        println!("{stats}");
    }

    println!();
    println!("Send to:");
    let mut emails = roster.participants();
    emails.sort();
    println!("{}", emails.join("; "));

    if !roster.excluded.is_empty() {
        println!();
        println!("Left out of this round:");
        for person in &roster.excluded {
            println!(" - {person}");
        }
    }

    if args.save {
        let path = store::save_round(&args.previous, &round)?;
        println!();
        println!("Saved to {}", path.display());
    }

    Ok(())
}
