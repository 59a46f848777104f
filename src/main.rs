use chrono::Local;
use clap::{Parser, Subcommand};
use std::{
    convert::Infallible,
    error::Error,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zetamac_trainer::{
    config::{ConfigStore, FileConfigStore},
    export::{default_export_path, export, read_json, ExportFormat},
    problem::{describe_parse, PARSER_SAMPLES},
    report::Report,
    session::{apply_session_config, FormCapabilities, FormState},
    store::ResultStore,
    record::is_valid_time,
    ProblemResult, Timestamp, Trainer,
};

/// find the arithmetic problems that slow you down and drill them
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Records Zetamac solve times, finds your slowest operations, numbers and patterns, and builds a focused practice session for the next game."
)]
pub struct Cli {
    /// path of the results database
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// path of the config file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// record one solved problem
    Record {
        /// problem text as shown by the game, e.g. "7 × 8"
        #[clap(long)]
        problem: String,

        /// solve time in milliseconds
        #[clap(long)]
        time: f64,

        /// epoch milliseconds or any text; defaults to now
        #[clap(long, value_parser = parse_timestamp)]
        timestamp: Option<Timestamp>,
    },

    /// import results from a JSON export
    Import { file: PathBuf },

    /// print the full analysis of recorded results
    Analyze,

    /// analyze, save the weakest pattern as the next goal and open the game
    Train {
        /// do not open the game in a browser
        #[clap(long)]
        no_browser: bool,
    },

    /// print the session settings for the stored goal, consuming it
    Session {
        /// use this goal key instead of the stored one, e.g. "*_7", "sub_borrow", "+"
        #[clap(long)]
        goal: Option<String>,

        /// the game form has no custom problems field
        #[clap(long)]
        no_custom: bool,

        /// the game form has no number range fields
        #[clap(long)]
        no_range: bool,
    },

    /// export recorded results
    Export {
        #[clap(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// output file, "-" for stdout; defaults to a timestamped file name
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// delete all recorded results and the stored goal
    Clear,

    /// print the effective settings
    Config {
        /// write them to the config file, filling in defaults
        #[clap(long)]
        write: bool,
    },

    /// show how problems are parsed
    CheckParser {
        /// problems to check instead of the built-in samples
        problems: Vec<String>,
    },
}

fn parse_timestamp(s: &str) -> Result<Timestamp, Infallible> {
    if let Ok(ms) = s.parse::<i64>() {
        return Ok(Timestamp::Millis(ms));
    }
    Ok(match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Timestamp::Number(n),
        _ => Timestamp::Text(s.to_string()),
    })
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if let Command::CheckParser { problems } = &cli.command {
        check_parser(problems);
        return Ok(());
    }

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = config_store.load();

    if let Command::Config { write } = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        if write {
            config_store.save(&config)?;
            info!("wrote {}", config_store.path().display());
        }
        return Ok(());
    }
    let store = match &cli.db {
        Some(path) => ResultStore::open(path)?,
        None => ResultStore::new()?,
    };
    let mut trainer = Trainer::new(store, config);

    match cli.command {
        Command::Record {
            problem,
            time,
            timestamp,
        } => {
            if !is_valid_time(time) {
                return Err(format!("invalid solve time: {time}").into());
            }
            let result = match timestamp {
                Some(ts) => ProblemResult::new(problem, time, ts),
                None => ProblemResult::now(problem, time),
            };
            trainer.store().record_result(&result)?;
            info!("recorded {} in {}ms", result.problem, result.time);
        }
        Command::Import { file } => {
            let (results, rejected): (Vec<_>, Vec<_>) =
                read_json(BufReader::new(File::open(&file)?))?
                    .into_iter()
                    .partition(ProblemResult::has_valid_time);
            for r in &rejected {
                warn!("skipping {:?}: invalid solve time {}", r.problem, r.time);
            }
            trainer.store_mut().record_results_batch(&results)?;
            println!("Imported {} results from {}", results.len(), file.display());
            if !rejected.is_empty() {
                println!("Skipped {} results with invalid times", rejected.len());
            }
        }
        Command::Analyze => {
            let results = trainer.load_results()?;
            let analysis = trainer.analyze()?;
            print_report(&trainer, &analysis, &results);
        }
        Command::Train { no_browser } => {
            let (analysis, goal) = trainer.prepare_training()?;
            let results = trainer.load_results()?;
            print_report(&trainer, &analysis, &results);

            match goal {
                Some(goal) => {
                    println!("\nNext session: {}", goal.label());
                    if !no_browser {
                        if let Err(e) = trainer.open_game() {
                            warn!("{e}");
                            println!("Open {} to start training", trainer.config().game_url);
                        }
                    }
                }
                None => println!("\nPlay more games to unlock targeted training."),
            }
        }
        Command::Session {
            goal,
            no_custom,
            no_range,
        } => {
            let capabilities = FormCapabilities {
                custom_problems: !no_custom,
                number_range: !no_range,
            };
            let Some(session) = trainer.next_session(goal.as_deref(), capabilities)? else {
                return Ok(());
            };

            let mut form = FormState::new(capabilities);
            apply_session_config(&session, &mut form);

            let out = serde_json::json!({ "session": session, "form": form });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Export { format, output } => {
            let results = trainer.load_results()?;
            match output {
                Some(path) if path.as_os_str() == "-" => {
                    let stdout = io::stdout();
                    let mut out = stdout.lock();
                    export(&results, format, &mut out)?;
                    out.flush()?;
                }
                output => {
                    let path = output.unwrap_or_else(|| default_export_path(format, Local::now()));
                    let mut out = BufWriter::new(File::create(&path)?);
                    export(&results, format, &mut out)?;
                    out.flush()?;
                    println!("Exported {} results to {}", results.len(), path.display());
                }
            }
        }
        Command::Clear => {
            trainer.store().clear_results()?;
            trainer.store().clear_training_goal()?;
            println!("All data cleared");
        }
        Command::CheckParser { .. } | Command::Config { .. } => {
            unreachable!("handled before opening the store")
        }
    }

    Ok(())
}

fn check_parser(problems: &[String]) {
    if problems.is_empty() {
        for problem in PARSER_SAMPLES {
            println!("{}", describe_parse(problem));
        }
    } else {
        for problem in problems {
            println!("{}", describe_parse(problem));
        }
    }
}

fn print_report(
    trainer: &Trainer,
    analysis: &zetamac_trainer::analysis::Analysis,
    results: &[ProblemResult],
) {
    let config = trainer.config();
    let report = Report::new(analysis, results)
        .with_limits(config.top_numbers, config.recent_problems)
        .with_min_total_results(config.min_total_results);
    print!("{report}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_cli_record() {
        let cli = Cli::parse_from([
            "zetamac-trainer",
            "record",
            "--problem",
            "7 × 8",
            "--time",
            "1500",
        ]);

        match cli.command {
            Command::Record {
                problem,
                time,
                timestamp,
            } => {
                assert_eq!(problem, "7 × 8");
                assert_eq!(time, 1500.0);
                assert_eq!(timestamp, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.db, None);
    }

    #[test]
    fn test_cli_timestamp_forms() {
        let cli = Cli::parse_from([
            "zetamac-trainer",
            "record",
            "--problem",
            "1 + 1",
            "--time",
            "300",
            "--timestamp",
            "1697712345678",
        ]);
        assert_matches!(
            cli.command,
            Command::Record { timestamp: Some(Timestamp::Millis(1697712345678)), .. }
        );

        assert_eq!(
            parse_timestamp("1697712345678.5").unwrap(),
            Timestamp::Number(1697712345678.5)
        );
        assert_eq!(
            parse_timestamp("2024-01-02T03:04:05Z").unwrap(),
            Timestamp::Text("2024-01-02T03:04:05Z".into())
        );
    }

    #[test]
    fn test_cli_global_db_after_subcommand() {
        let cli = Cli::parse_from(["zetamac-trainer", "analyze", "--db", "/tmp/x.db"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert_matches!(cli.command, Command::Analyze);
    }

    #[test]
    fn test_cli_session_flags() {
        let cli = Cli::parse_from(["zetamac-trainer", "session", "--goal", "*_7", "--no-range"]);
        match cli.command {
            Command::Session {
                goal,
                no_custom,
                no_range,
            } => {
                assert_eq!(goal.as_deref(), Some("*_7"));
                assert!(!no_custom);
                assert!(no_range);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_export_defaults() {
        let cli = Cli::parse_from(["zetamac-trainer", "export"]);
        assert_matches!(
            cli.command,
            Command::Export { format: ExportFormat::Json, output: None }
        );

        let cli = Cli::parse_from(["zetamac-trainer", "export", "--format", "csv", "-o", "-"]);
        assert_matches!(cli.command, Command::Export { format: ExportFormat::Csv, .. });
    }

    #[test]
    fn test_cli_rejects_missing_subcommand() {
        assert!(Cli::try_parse_from(["zetamac-trainer"]).is_err());
    }
}
