// tests/path_resolution.rs

mod common;
use crate::common::mock_fs;

use std::path::{Path, PathBuf};

use vscode_test_cli::errors::CliError;
use vscode_test_cli::resolve::{
    gather_files, normalize_path, relative_path, resolve_against, resolve_module,
};

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn paths(xs: &[&str]) -> Vec<PathBuf> {
    xs.iter().map(PathBuf::from).collect()
}

#[test]
fn normalize_folds_dots() {
    assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
    assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
    assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
    assert_eq!(resolve_against(Path::new("/proj"), "out/../test"), PathBuf::from("/proj/test"));
    assert_eq!(resolve_against(Path::new("/proj"), "/abs"), PathBuf::from("/abs"));
}

#[test]
fn relative_module_resolves_exact_then_js() {
    let fs = mock_fs(&[
        ("/proj/setup.js", ""),
        ("/proj/helpers/register.js", ""),
    ]);

    assert_eq!(
        resolve_module(&fs, Path::new("/proj"), "./setup.js").unwrap(),
        PathBuf::from("/proj/setup.js")
    );
    assert_eq!(
        resolve_module(&fs, Path::new("/proj"), "./helpers/register").unwrap(),
        PathBuf::from("/proj/helpers/register.js")
    );
}

#[test]
fn directory_module_uses_package_main_then_index() {
    let fs = mock_fs(&[
        ("/proj/lib/package.json", r#"{ "main": "dist/entry" }"#),
        ("/proj/lib/dist/entry.js", ""),
        ("/proj/plain/index.js", ""),
        ("/proj/broken/package.json", r#"{ "main": "missing.js" }"#),
        ("/proj/broken/index.js", ""),
    ]);

    assert_eq!(
        resolve_module(&fs, Path::new("/proj"), "./lib").unwrap(),
        PathBuf::from("/proj/lib/dist/entry.js")
    );
    assert_eq!(
        resolve_module(&fs, Path::new("/proj"), "./plain").unwrap(),
        PathBuf::from("/proj/plain/index.js")
    );
    assert_eq!(
        resolve_module(&fs, Path::new("/proj"), "./broken").unwrap(),
        PathBuf::from("/proj/broken/index.js")
    );
}

#[test]
fn bare_module_walks_node_modules_upwards() {
    let fs = mock_fs(&[
        ("/repo/node_modules/ts-node/package.json", r#"{ "main": "dist/index.js" }"#),
        ("/repo/node_modules/ts-node/dist/index.js", ""),
        ("/repo/node_modules/source-map-support/register.js", ""),
        ("/repo/packages/ext/package.json", "{}"),
    ]);
    let base = Path::new("/repo/packages/ext");

    assert_eq!(
        resolve_module(&fs, base, "ts-node").unwrap(),
        PathBuf::from("/repo/node_modules/ts-node/dist/index.js")
    );
    assert_eq!(
        resolve_module(&fs, base, "source-map-support/register").unwrap(),
        PathBuf::from("/repo/node_modules/source-map-support/register.js")
    );
}

#[test]
fn unresolvable_bare_module_suggests_installing() {
    let fs = mock_fs(&[("/proj/package.json", "{}")]);

    let err = resolve_module(&fs, Path::new("/proj"), "ts-node/register").unwrap_err();

    assert!(matches!(err, CliError::ModuleNotFound { .. }));
    assert!(err.is_user_facing());
    let msg = err.to_string();
    assert!(msg.contains("ts-node/register"), "{msg}");
    assert!(msg.contains("installed as a dependency"), "{msg}");
}

#[test]
fn unresolvable_relative_module_has_no_install_hint() {
    let fs = mock_fs(&[("/proj/package.json", "{}")]);

    let err = resolve_module(&fs, Path::new("/proj"), "./nope").unwrap_err();

    assert!(!err.to_string().contains("installed"));
}

#[test]
fn globs_expand_relative_to_base_sorted() {
    let fs = mock_fs(&[
        ("/proj/test/b.spec.js", ""),
        ("/proj/test/a.spec.js", ""),
        ("/proj/test/helper.js", ""),
        ("/proj/test/nested/c.spec.js", ""),
    ]);

    let files = gather_files(&fs, Path::new("/proj"), &strings(&["test/*.spec.js"]), &[]).unwrap();
    assert_eq!(files, paths(&["/proj/test/a.spec.js", "/proj/test/b.spec.js"]));

    let deep = gather_files(&fs, Path::new("/proj"), &strings(&["./test/**/*.spec.js"]), &[]).unwrap();
    assert_eq!(
        deep,
        paths(&[
            "/proj/test/a.spec.js",
            "/proj/test/b.spec.js",
            "/proj/test/nested/c.spec.js"
        ])
    );
}

#[test]
fn hidden_entries_are_not_matched_by_wildcards() {
    let fs = mock_fs(&[
        ("/proj/test/a.spec.js", ""),
        ("/proj/test/.cache/x.spec.js", ""),
        ("/proj/test/.hidden.spec.js", ""),
    ]);

    let files = gather_files(&fs, Path::new("/proj"), &strings(&["test/**/*.spec.js"]), &[]).unwrap();

    assert_eq!(files, paths(&["/proj/test/a.spec.js"]));
}

#[test]
fn literal_entries_and_dedup() {
    let fs = mock_fs(&[("/proj/test/a.spec.js", ""), ("/proj/test/b.spec.js", "")]);

    let files = gather_files(
        &fs,
        Path::new("/proj"),
        &strings(&[
            "test/b.spec.js",
            "test/*.spec.js",
            "/elsewhere/abs.spec.js",
            "test/missing.spec.js",
        ]),
        &[],
    )
    .unwrap();

    assert_eq!(
        files,
        paths(&[
            "/proj/test/b.spec.js",
            "/proj/test/a.spec.js",
            "/elsewhere/abs.spec.js"
        ])
    );
}

#[test]
fn ignore_applies_to_globbed_and_absolute_entries() {
    let fs = mock_fs(&[
        ("/proj/test/a.spec.js", ""),
        ("/proj/test/slow.spec.js", ""),
    ]);

    let files = gather_files(
        &fs,
        Path::new("/proj"),
        &strings(&["test/*.spec.js", "/proj/test/slow.spec.js", "/other/x.spec.js"]),
        &strings(&["**/slow.spec.js", "/other/**"]),
    )
    .unwrap();

    assert_eq!(files, paths(&["/proj/test/a.spec.js"]));
}

#[test]
fn missing_glob_root_yields_nothing() {
    let fs = mock_fs(&[("/proj/package.json", "{}")]);

    let files = gather_files(&fs, Path::new("/proj"), &strings(&["out/**/*.test.js"]), &[]).unwrap();

    assert!(files.is_empty());
}

#[test]
fn symlinked_directories_are_not_walked() {
    let fs = mock_fs(&[
        ("/proj/test/a.spec.js", ""),
        ("/proj/test/linked/b.spec.js", ""),
    ]);
    fs.mark_symlink("/proj/test/linked");

    let files = gather_files(&fs, Path::new("/proj"), &strings(&["**/*.spec.js"]), &[]).unwrap();

    assert_eq!(files, paths(&["/proj/test/a.spec.js"]));
}

#[cfg(unix)]
#[test]
fn symlink_cycle_yields_each_file_once() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    std::fs::create_dir_all(root.join("test"))?;
    std::fs::write(root.join("test/a.spec.js"), "")?;
    std::os::unix::fs::symlink(&root, root.join("test/loop"))?;

    let files = gather_files(
        &vscode_test_cli::fs::RealFileSystem,
        &root,
        &strings(&["**/*.spec.js"]),
        &[],
    )?;

    assert_eq!(files, vec![root.join("test/a.spec.js")]);
    Ok(())
}

#[test]
fn relative_path_goes_through_the_given_filesystem() {
    let fs = mock_fs(&[("/proj/test/a.spec.js", "")]);

    assert_eq!(
        relative_path(&fs, Path::new("/proj"), Path::new("/proj/test/a.spec.js")),
        Some("test/a.spec.js".to_string())
    );
    // Neither side exists in the mock, so canonicalizing fails instead of
    // falling back to the real disk.
    assert_eq!(relative_path(&fs, Path::new("/tmp"), Path::new("/var/x")), None);
}
