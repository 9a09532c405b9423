//! Subcommand handlers

use anyhow::Context;
use clap::ArgMatches;
use std::fmt::Write as _;
use std::path::PathBuf;
use studio_pipeline::{BatchRunner, StudioConfig};
use studio_rank::{explain, RankedEntry};
use studio_store::{HistoryLedger, RunSummary, SystemClock};

fn load_config(args: &ArgMatches) -> anyhow::Result<StudioConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => StudioConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(StudioConfig::default()),
    }
}

fn apply_overrides(mut config: StudioConfig, args: &ArgMatches) -> StudioConfig {
    if let Some(&creatives) = args.get_one::<u32>("creatives") {
        config.batch.creatives = creatives;
    }
    if let Some(&seed) = args.get_one::<u64>("seed") {
        config.batch.seed = seed;
    }
    if let Some(root) = args.get_one::<PathBuf>("runs-root") {
        config.paths.runs_root.clone_from(root);
    }
    if let Some(logo) = args.get_one::<PathBuf>("logo") {
        config.assets.logo.clone_from(logo);
    }
    let brief = &mut config.brief;
    for (name, field) in [
        ("product", &mut brief.product),
        ("style", &mut brief.style),
        ("tone", &mut brief.tone),
        ("audience", &mut brief.audience),
    ] {
        if let Some(value) = args.get_one::<String>(name) {
            field.clone_from(value);
        }
    }
    if args.get_flag("offline") {
        config = config.offline();
    }
    config
}

pub(crate) fn generate(args: &ArgMatches) -> anyhow::Result<()> {
    let config = apply_overrides(load_config(args)?, args);
    let collaborators = config.collaborators();

    let outcome = BatchRunner::new(&config)
        .run(&collaborators, &SystemClock)
        .context("batch failed")?;

    println!("Run:     {}", outcome.run_id);
    println!("Folder:  {}", outcome.run_root.display());
    println!("Report:  {}", outcome.report_path.display());
    println!("Archive: {}", outcome.archive_path.display());
    if let Some(best) = outcome.best() {
        println!(
            "Best:    {} (score {})",
            best.image_file_name(),
            best.score()
        );
    }
    Ok(())
}

pub(crate) fn rank(args: &ArgMatches, json: bool) -> anyhow::Result<()> {
    let scores: Vec<f64> = args
        .get_many::<f64>("scores")
        .map(|values| values.copied().collect())
        .unwrap_or_default();

    let mut config = load_config(args)?.ranking;
    if let Some(&seed) = args.get_one::<u64>("seed") {
        config = config.with_seed(seed);
    }
    config.validate().context("invalid ranking configuration")?;

    let entries = explain(&scores, &config);
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", render_ranking(&entries));
    }
    Ok(())
}

pub(crate) fn history(args: &ArgMatches, json: bool) -> anyhow::Result<()> {
    let path = match args.get_one::<PathBuf>("history-file") {
        Some(path) => path.clone(),
        None => load_config(args)?.paths.history_file,
    };
    let entries = HistoryLedger::open(&path)
        .entries()
        .with_context(|| format!("reading history from {}", path.display()))?;

    let skip = args
        .get_one::<usize>("limit")
        .map_or(0, |&limit| entries.len().saturating_sub(limit));
    let entries = &entries[skip..];

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        print!("{}", render_history(entries));
    }
    Ok(())
}

fn render_ranking(entries: &[RankedEntry]) -> String {
    let mut out = String::from("rank  index  score     anomaly     key\n");
    for entry in entries {
        let anomaly = entry
            .anomaly_score
            .map_or_else(|| "-".to_string(), |a| format!("{a:.4}"));
        let _ = writeln!(
            out,
            "{:<5} {:<6} {:<9} {:<11} {:.4}",
            entry.rank,
            entry.index + 1,
            entry.raw_score,
            anomaly,
            entry.combined_key
        );
    }
    out
}

fn render_history(entries: &[RunSummary]) -> String {
    if entries.is_empty() {
        return "no runs recorded\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let best = entry
            .meta
            .best_score
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        let _ = writeln!(
            out,
            "{}  {} creatives  best {}  {} / {} / {}  {}",
            entry.run_id,
            entry.meta.total_creatives,
            best,
            entry.meta.style,
            entry.meta.tone,
            entry.meta.audience,
            entry.path
        );
    }
    out
}
