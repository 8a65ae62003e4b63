// tests/watch_patterns.rs

use std::path::{Path, PathBuf};

use notify::event::{
    AccessKind, CreateKind, DataChange, EventKind, MetadataKind, ModifyKind, RemoveKind, RenameMode,
};
use notify::Event;
use tokio::sync::mpsc;

use vscode_test_cli::cli::CliArgs;
use vscode_test_cli::engine::RuntimeEvent;
use vscode_test_cli::types::ChangeKind;
use vscode_test_cli::watch::{classify, process_event, WatchDefaults, WatchProfile};

fn profile(args: &CliArgs, coverage: Option<&Path>) -> WatchProfile {
    WatchProfile::new(&WatchDefaults::from_args(args, Path::new("/proj"), coverage)).unwrap()
}

#[test]
fn classifies_notify_events() {
    use ChangeKind::*;

    assert_eq!(classify(&EventKind::Create(CreateKind::File)), Some(Structural));
    assert_eq!(classify(&EventKind::Remove(RemoveKind::Any)), Some(Structural));
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
        Some(Structural)
    );
    assert_eq!(classify(&EventKind::Any), Some(Structural));
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
        Some(Content)
    );
    assert_eq!(classify(&EventKind::Modify(ModifyKind::Any)), Some(Content));
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime))),
        None
    );
    assert_eq!(classify(&EventKind::Access(AccessKind::Any)), None);
    assert_eq!(classify(&EventKind::Other), None);
}

#[test]
fn defaults_watch_everything_except_noise() {
    let p = profile(&CliArgs::default(), None);

    assert!(p.matches("src/extension.ts"));
    assert!(p.matches("package.json"));
    assert!(!p.matches("node_modules/lib/index.js"));
    assert!(!p.matches("packages/a/node_modules/x.js"));
    assert!(!p.matches(".git/HEAD"));
    assert!(!p.matches(".vscode-test/vscode-linux-x64/code"));
    assert!(!p.matches(""));
}

#[test]
fn cli_globs_replace_watch_and_extend_ignore() {
    let args = CliArgs {
        watch_files: vec!["src/**/*.ts".into()],
        watch_ignore: vec!["**/*.d.ts".into()],
        ..CliArgs::default()
    };
    let p = profile(&args, None);

    assert!(p.matches("src/a.ts"));
    assert!(!p.matches("src/a.d.ts"));
    assert!(!p.matches("README.md"));
}

#[test]
fn coverage_output_under_root_is_ignored() {
    let defaults = WatchDefaults::from_args(
        &CliArgs::default(),
        Path::new("/proj"),
        Some(Path::new("/proj/coverage")),
    );
    assert!(defaults.ignore.contains(&"coverage/**".to_string()));

    let p = WatchProfile::new(&defaults).unwrap();
    assert!(!p.matches("coverage/coverage-1.json"));

    let outside = WatchDefaults::from_args(
        &CliArgs::default(),
        Path::new("/proj"),
        Some(Path::new("/elsewhere/coverage")),
    );
    assert_eq!(outside.ignore.len(), 3);
}

#[test]
fn invalid_glob_is_an_error() {
    let defaults = WatchDefaults {
        watch: vec!["src/[".into()],
        ignore: vec![],
    };
    assert!(WatchProfile::new(&defaults).is_err());
}

#[tokio::test]
async fn process_event_forwards_matching_paths_with_kind() {
    let (tx, mut rx) = mpsc::channel(8);
    let p = profile(&CliArgs::default(), None);
    let event = Event::new(EventKind::Create(CreateKind::File))
        .add_path(PathBuf::from("/proj/test/new.spec.js"))
        .add_path(PathBuf::from("/proj/node_modules/x/index.js"));

    let sent = process_event(Path::new("/proj"), &event, &p, &tx).await;

    assert_eq!(sent, 1);
    assert_eq!(
        rx.recv().await,
        Some(RuntimeEvent::FileChanged {
            path: PathBuf::from("/proj/test/new.spec.js"),
            kind: ChangeKind::Structural,
        })
    );
}

#[tokio::test]
async fn process_event_drops_ignored_kinds() {
    let (tx, mut rx) = mpsc::channel(8);
    let p = profile(&CliArgs::default(), None);
    let event = Event::new(EventKind::Access(AccessKind::Any))
        .add_path(PathBuf::from("/proj/src/a.ts"));

    assert_eq!(process_event(Path::new("/proj"), &event, &p, &tx).await, 0);
    drop(tx);
    assert_eq!(rx.recv().await, None);
}
