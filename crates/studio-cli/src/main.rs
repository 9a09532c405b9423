//! `creative-studio` command-line interface

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

fn cli() -> Command {
    Command::new("creative-studio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Batch ad-creative generation, ranking and run history")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit JSON log lines and JSON output"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Path to studio TOML configuration"),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate, rank and archive one batch of creatives")
                .arg(
                    Arg::new("creatives")
                        .long("creatives")
                        .short('n')
                        .value_parser(value_parser!(u32))
                        .help("Number of creatives"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Run seed for scoring and ranking"),
                )
                .arg(
                    Arg::new("runs-root")
                        .long("runs-root")
                        .value_parser(value_parser!(std::path::PathBuf))
                        .help("Directory for run folders"),
                )
                .arg(
                    Arg::new("logo")
                        .long("logo")
                        .value_parser(value_parser!(std::path::PathBuf))
                        .help("Logo image for slogan and brand colours"),
                )
                .arg(Arg::new("product").long("product").help("Product name"))
                .arg(Arg::new("style").long("style").help("Visual style"))
                .arg(Arg::new("tone").long("tone").help("Copy tone"))
                .arg(Arg::new("audience").long("audience").help("Target audience"))
                .arg(
                    Arg::new("offline")
                        .long("offline")
                        .action(ArgAction::SetTrue)
                        .help("Skip remote services and use fallbacks"),
                ),
        )
        .subcommand(
            Command::new("rank")
                .about("Rank engagement scores and explain the order")
                .arg(
                    Arg::new("scores")
                        .required(true)
                        .num_args(1..)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Scores in creative order"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Forest seed"),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("List recorded runs")
                .arg(
                    Arg::new("history-file")
                        .long("history-file")
                        .value_parser(value_parser!(std::path::PathBuf))
                        .help("Ledger to read"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .help("Show only the most recent entries"),
                ),
        )
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn dispatch(matches: &ArgMatches) -> anyhow::Result<()> {
    let json = matches.get_flag("json");
    match matches.subcommand() {
        Some(("generate", args)) => commands::generate(args),
        Some(("rank", args)) => commands::rank(args, json),
        Some(("history", args)) => commands::history(args, json),
        _ => Ok(()),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("json"));

    match dispatch(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn rank_accepts_scores_and_global_flags() {
        let matches = cli()
            .try_get_matches_from(["creative-studio", "rank", "80", "95", "70", "--json"])
            .unwrap();
        assert!(matches.get_flag("json"));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "rank");
        let scores: Vec<f64> = args.get_many::<f64>("scores").unwrap().copied().collect();
        assert_eq!(scores, vec![80.0, 95.0, 70.0]);
    }

    #[test]
    fn rank_requires_scores() {
        assert!(cli()
            .try_get_matches_from(["creative-studio", "rank"])
            .is_err());
    }

    #[test]
    fn generate_overrides_parse() {
        let matches = cli()
            .try_get_matches_from([
                "creative-studio",
                "generate",
                "-n",
                "3",
                "--seed",
                "7",
                "--offline",
                "--tone",
                "Bold",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<u32>("creatives"), Some(&3));
        assert_eq!(args.get_one::<u64>("seed"), Some(&7));
        assert!(args.get_flag("offline"));
        assert_eq!(args.get_one::<String>("tone").map(String::as_str), Some("Bold"));
    }
}
