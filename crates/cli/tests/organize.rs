use chrono::{DateTime, Local};
use downsort_core::calendar;
use downsort_core::categories::default_rules;
use downsort_core::config::{AppConfig, SourceConfig};
use downsort_core::logbook::LOG_FILE_NAME;
use downsort_core::pipeline::{self, OrganizeOptions};
use downsort_core::placer;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config_for(root: &Path) -> AppConfig {
    AppConfig {
        source: SourceConfig {
            root: Some(root.to_string_lossy().into_owned()),
            exclude: vec![],
        },
        ..AppConfig::default()
    }
}

fn expected_destination(source: &Path, root: &Path) -> std::path::PathBuf {
    let mtime = fs::metadata(source).unwrap().modified().unwrap();
    placer::plan(
        source,
        DateTime::<Local>::from(mtime),
        &default_rules(),
        root,
    )
    .destination
}

#[tokio::test]
async fn organize_moves_files_into_dated_buckets() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    for name in ["invoice.pdf", "movie.mkv", "photo.jpg", "data.csv", "mystery.bin"] {
        fs::write(root.join(name), name).unwrap();
    }
    let expected: Vec<_> = ["invoice.pdf", "movie.mkv", "photo.jpg", "data.csv", "mystery.bin"]
        .iter()
        .map(|name| expected_destination(&root.join(name), root))
        .collect();

    let cfg = config_for(root);
    let run = pipeline::run_organize(&cfg, OrganizeOptions::default())
        .await
        .unwrap();

    assert_eq!(run.summary.moved, 5);
    for (name, dest) in ["invoice.pdf", "movie.mkv", "photo.jpg", "data.csv", "mystery.bin"]
        .iter()
        .zip(&expected)
    {
        assert!(!root.join(name).exists(), "{} should have moved", name);
        assert!(dest.exists(), "{} missing", dest.display());
    }
    // The bucket layout is category/year/month/half.
    let invoice = &expected[0];
    assert!(invoice.starts_with(root.join("documentos")));
    let mystery = &expected[4];
    assert!(mystery.starts_with(root.join("otros")));

    let log = fs::read_to_string(root.join(LOG_FILE_NAME)).unwrap();
    assert_eq!(log.lines().count(), 5);
    assert!(log.contains("invoice.pdf"));
}

#[tokio::test]
async fn dry_run_plans_the_same_destinations_without_moving() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let source = root.join("invoice.pdf");
    fs::write(&source, "pdf bytes").unwrap();
    let expected = expected_destination(&source, root);

    let cfg = config_for(root);
    let run = pipeline::run_organize(
        &cfg,
        OrganizeOptions {
            recursive: false,
            dry_run: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(run.summary.planned, 1);
    assert_eq!(run.summary.moved, 0);
    assert!(source.exists());
    assert!(!expected.exists());
    assert!(!root.join(LOG_FILE_NAME).exists(), "dry run must not log");

    match &run.outcomes[0].placement {
        downsort_core::placer::Placement::Planned(decision) => {
            assert_eq!(decision.destination, expected)
        }
        other => panic!("expected a plan, got {:?}", other),
    }
}

#[tokio::test]
async fn colliding_names_keep_both_files() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("a.txt"), "first").unwrap();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("a.txt"), "second").unwrap();

    let cfg = config_for(root);
    let run = pipeline::run_organize(
        &cfg,
        OrganizeOptions {
            recursive: true,
            dry_run: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(run.summary.moved, 2);

    let moved: Vec<_> = run
        .outcomes
        .iter()
        .filter_map(|o| match &o.placement {
            downsort_core::placer::Placement::Moved(r) => Some(r.destination.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(moved.len(), 2);
    assert_eq!(moved[0].parent(), moved[1].parent());
    assert_ne!(moved[0], moved[1]);

    let mut contents: Vec<String> = moved
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();
    contents.sort();
    assert_eq!(contents, vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn second_pass_finds_nothing_to_move() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("notes.md"), "text").unwrap();

    let cfg = config_for(root);
    let first = pipeline::run_organize(&cfg, OrganizeOptions::default())
        .await
        .unwrap();
    assert_eq!(first.summary.moved, 1);

    // Non-recursive second pass: only the log remains at the root.
    let second = pipeline::run_organize(&cfg, OrganizeOptions::default())
        .await
        .unwrap();
    assert_eq!(second.summary.moved, 0);

    // Even a recursive pass over the same tree leaves placed files alone.
    let third = pipeline::run_organize(
        &cfg,
        OrganizeOptions {
            recursive: true,
            dry_run: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(third.summary.moved, 0);

    let log = fs::read_to_string(root.join(LOG_FILE_NAME)).unwrap();
    assert_eq!(log.lines().count(), 1, "no duplicate move records");
}

#[tokio::test]
async fn separate_destination_root_is_pruned_from_recursive_scans() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let dest = root.join("sorted");
    fs::write(root.join("song.webm"), "x").unwrap();

    let mut cfg = config_for(root);
    cfg.destination.root = Some(dest.to_string_lossy().into_owned());

    let first = pipeline::run_organize(
        &cfg,
        OrganizeOptions {
            recursive: true,
            dry_run: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(first.summary.moved, 1);
    assert!(dest.join("videos").exists());

    let second = pipeline::run_organize(
        &cfg,
        OrganizeOptions {
            recursive: true,
            dry_run: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(second.summary.discovered, 0, "sorted subtree is pruned");
}

#[tokio::test]
async fn temp_downloads_are_left_in_place() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let partial = root.join("big_file.mp4.crdownload");
    fs::write(&partial, "half").unwrap();

    let cfg = config_for(root);
    let run = pipeline::run_organize(&cfg, OrganizeOptions::default())
        .await
        .unwrap();
    assert_eq!(run.summary.moved, 0);
    assert!(partial.exists());
}
