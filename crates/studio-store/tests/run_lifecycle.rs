use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use studio_rank::{rank, RankingConfig};
use studio_store::{
    scores_of, ArchiveBuilder, ArtifactKind, BrandPalette, FixedClock, HistoryLedger,
    RankingReport, RecordBuilder, Rgb, RunBrief, RunContext, RunMeta, RunStore, ScoringConfig,
    SeededScorer, StoreError,
};

fn clock(second: u32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, second).unwrap())
}

#[test]
fn test_full_run_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::new(dir.path().join("generated_runs"));
    let ledger = HistoryLedger::open(dir.path().join("run_history.json"));

    let run = store.create_run(&clock(0)).unwrap();
    let ctx = RunContext::new(
        run,
        RunBrief::default(),
        "Hear more",
        BrandPalette::new(Rgb(10, 20, 30), Rgb(200, 210, 220)),
        42,
    );

    let mut scorer = SeededScorer::new(ScoringConfig::default(), ctx.seed());
    let mut builder = RecordBuilder::new(&ctx);
    let records: Vec<_> = (1..=6)
        .map(|i| {
            let image = ctx
                .run()
                .write_artifact(ArtifactKind::Ad, i, b"\x89PNG")
                .unwrap();
            builder
                .build_record(i, &image, "Level up your ears 🎮", &mut scorer)
                .unwrap()
        })
        .collect();

    let ranking = rank(&scores_of(&records), &RankingConfig::default());
    let report = RankingReport::new(&records, &ranking).unwrap();
    let report_path = ctx.run().write_ranking_report(&report).unwrap();
    assert_eq!(std::fs::read_to_string(report_path).unwrap().lines().count(), 6);

    for (line, index) in report.lines().iter().zip(ranking.iter()) {
        assert_eq!(line.file, format!("ad_{}.png", index + 1));
        assert_eq!(line.score, records[index].score());
    }

    let meta = RunMeta::from_records(&ctx, &records);
    let best = scores_of(&records).into_iter().fold(f64::MIN, f64::max);
    assert_eq!(meta.best_score, Some(best));
    assert_eq!(meta.total_creatives, 6);

    ledger
        .append(ctx.run().id(), ctx.run().root(), meta, &clock(1))
        .unwrap();
    let archive = ArchiveBuilder::new()
        .build(ctx.run(), &records, &ranking)
        .unwrap();
    assert!(archive.is_file());

    let history = ledger.entries().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].run_id, ctx.run().id().as_str());
    assert_eq!(history[0].meta.brand_colors.hex(), ["#0a141e", "#c8d2dc"]);
}

#[test]
fn test_scores_reproducible_for_seed() {
    let dir = tempfile::tempdir().unwrap();
    let scores_for = |root: &std::path::Path| {
        let run = RunStore::new(root).create_run(&clock(0)).unwrap();
        let ctx = RunContext::new(
            run,
            RunBrief::default(),
            "s",
            BrandPalette::new(Rgb(0, 0, 0), Rgb(1, 1, 1)),
            9,
        );
        let mut scorer = SeededScorer::new(ScoringConfig::default(), ctx.seed());
        let mut builder = RecordBuilder::new(&ctx);
        let records: Vec<_> = (1..=4)
            .map(|i| {
                let image = ctx.run().write_artifact(ArtifactKind::Ad, i, b"x").unwrap();
                builder.build_record(i, &image, "c", &mut scorer).unwrap()
            })
            .collect();
        scores_of(&records)
    };

    assert_eq!(
        scores_for(&dir.path().join("a")),
        scores_for(&dir.path().join("b"))
    );
}

#[test]
fn test_history_appends_in_order_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::new(dir.path().join("runs"));
    let ledger = HistoryLedger::open(dir.path().join("run_history.json"));

    let mut ids = Vec::new();
    for second in [10, 20, 30] {
        let run = store.create_run(&clock(second)).unwrap();
        let ctx = RunContext::new(
            run,
            RunBrief::default(),
            "s",
            BrandPalette::new(Rgb(0, 0, 0), Rgb(1, 1, 1)),
            1,
        );
        let meta = RunMeta::from_records(&ctx, &[]);
        assert_eq!(meta.best_score, None);
        ledger
            .append(ctx.run().id(), ctx.run().root(), meta, &clock(second))
            .unwrap();
        ids.push(ctx.run().id().to_string());

        let snapshot: Vec<String> = ledger
            .entries()
            .unwrap()
            .into_iter()
            .map(|e| e.run_id)
            .collect();
        assert_eq!(snapshot, ids);
    }
}

#[test]
fn test_collision_rejected_with_clear_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::new(dir.path());
    store.create_run(&clock(0)).unwrap();
    let err = store.create_run(&clock(0)).unwrap_err();
    assert!(matches!(err, StoreError::RunExists { ref run_id } if run_id == "20261014_093000"));
}
