use std::{fs, path::PathBuf};

use ansi_term::Colour::{Green, Yellow};
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use moment_finder::{Config, Game, Interesting, Logger, MomentKind, Searcher, UciEngine};

/// Arguments to the finder
#[derive(Parser, Debug)]
#[command(
    name = "Moment Finder",
    about = "Finds the first position of a game where one side had a single forced winning line."
)]
struct Cli {
    /// The game to scan, as JSON with UCI moves and optional evaluations
    #[arg(short, long)]
    input: PathBuf,
    /// Where to write the moment; printed to stdout if not given
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Path to a UCI engine
    #[arg(short, long, default_value = "stockfish")]
    engine: String,
    /// Number of search threads for the engine
    #[arg(short, long)]
    threads: Option<u32>,
    /// A JSON file with search budgets, thresholds and engine options
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// How much to log, from 0 (warnings only) to 10 (everything)
    #[arg(short, long, default_value = "2")]
    verbosity: u8,
    /// Whether to only print the moment itself, without the summary
    #[arg(short, long)]
    quiet: bool,
}

fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    match verbosity {
        _ if quiet => LevelFilter::Warn,
        0 => LevelFilter::Warn,
        1..=2 => LevelFilter::Info,
        3..=6 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn summary(game: &Game, found: &Interesting) -> String {
    let kind = match found.kind {
        MomentKind::Mate => "forced mate",
        MomentKind::Advantage => "winning line",
    };
    let (first, last) = found.marks();
    let line: Vec<String> = found.line.iter().map(|mv| mv.to_string()).collect();
    format!(
        "{} in {} after {} plies: {} [moves {}..={}]",
        Green.bold().paint(kind),
        game.id().unwrap_or("game"),
        found.mainline.len(),
        line.join(" "),
        first,
        last
    )
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(level_filter(cli.verbosity, cli.quiet))
        .target(env_logger::Target::Stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(threads) = cli.threads {
        config.set_engine_option("Threads", threads);
    }

    let json = fs::read_to_string(&cli.input).with_context(|| format!("reading {}", cli.input.display()))?;
    let mut game = Game::from_json(&json).with_context(|| format!("loading {}", cli.input.display()))?;
    let tier = game.tier();

    let logger = Logger::new(cli.verbosity);
    let mut engine = UciEngine::open(&cli.engine, &config.engine_options, logger.clone())
        .with_context(|| format!("starting {}", cli.engine))?;

    let found = {
        let mut searcher = Searcher::new(&mut engine, config, logger);
        let added = searcher.annotate(&mut game)?;
        log::info!("Added {} evaluations, scanning at tier {}", added, tier);
        searcher.find_interesting(&game, tier)?
    };
    engine.close()?;

    let Some(found) = found else {
        if !cli.quiet {
            eprintln!("{}", Yellow.paint("No interesting moment found"));
        }
        return Ok(());
    };

    let moment = serde_json::to_string(&found.to_moment(&game))?;
    match &cli.output {
        Some(path) => fs::write(path, moment + "\n").with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", moment),
    }

    if !cli.quiet {
        eprintln!("{}", summary(&game, &found));
    }
    Ok(())
}
