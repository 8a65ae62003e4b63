// tests/desktop_prepare.rs

mod common;
use crate::common::{args, init_tracing, mock_fs, prepare_context, RUNNER_ENTRY};

use std::path::PathBuf;

use serde_json::json;

use vscode_test_cli::config::ResolvedConfiguration;
use vscode_test_cli::errors::CliError;
use vscode_test_cli::fs::mock::MockFileSystem;
use vscode_test_cli::cli::CliArgs;
use vscode_test_cli::list_configuration;
use vscode_test_cli::platform::desktop::{
    RunnerEnvOptions, COVERAGE_ENV_VAR, OPTIONS_ENV_VAR, RUN_AS_NODE_ENV_VAR,
};
use vscode_test_cli::platform::extensions::merge_extensions;
use vscode_test_cli::platform::{
    prepare_all, DesktopPlatform, DesktopRunDescription, PreparedDesktopRun, RunContext,
};
use vscode_test_cli::types::OneOrMany;
use vscode_test_cli_test_utils::builders::{ConfigBuilder, TestConfigBuilder};

const CONFIG: &str = "/proj/.vscode-test.json";

fn project() -> MockFileSystem {
    mock_fs(&[
        ("/proj/test/a.spec.js", ""),
        ("/proj/test/b.spec.js", ""),
        ("/proj/test/only.spec.js", ""),
        ("/proj/setup.js", ""),
        ("/proj/node_modules/ts-node/register.js", ""),
    ])
}

fn prepare(fs: MockFileSystem, config: ResolvedConfiguration, args: CliArgs) -> PreparedDesktopRun {
    init_tracing();
    let ctx = prepare_context(fs, config, args);
    let test = ctx.config.tests()[0].clone();
    DesktopPlatform
        .prepare(&ctx, 0, &test)
        .expect("prepare")
        .expect("desktop claims the configuration")
}

fn runner_options(run: &PreparedDesktopRun) -> RunnerEnvOptions {
    let env = run.launch_plan(&RunContext::default()).env;
    let raw = env[OPTIONS_ENV_VAR].as_deref().expect("options env");
    serde_json::from_str(raw).expect("options json")
}

#[test]
fn env_contract_carries_files_preload_and_runner_options() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(
            TestConfigBuilder::new("test/*.spec.js")
                .runner_option("ui", json!("tdd"))
                .runner_option("timeout", json!(1000))
                .preload(&["./setup.js"])
                .env("CUSTOM", Some("1"))
                .build(),
        )
        .build();
    let mut args = args();
    args.runner.timeout = Some(5000);
    args.file = vec!["ts-node/register".into()];

    let run = prepare(project(), config, args);
    let opts = runner_options(&run);

    assert_eq!(opts.mocha_opts.get("ui"), Some(&json!("tdd")));
    assert_eq!(opts.mocha_opts.get("timeout"), Some(&json!(5000)));
    assert!(!opts.mocha_opts.contains_key("preload"));
    assert_eq!(
        opts.preload,
        vec!["/proj/setup.js", "/proj/node_modules/ts-node/register.js"]
    );
    assert_eq!(
        opts.files,
        vec!["/proj/test/a.spec.js", "/proj/test/b.spec.js", "/proj/test/only.spec.js"]
    );

    let env = run.launch_plan(&RunContext::default()).env;
    assert_eq!(env.get("CUSTOM"), Some(&Some("1".to_string())));
    assert_eq!(env.get(RUN_AS_NODE_ENV_VAR), Some(&None));
    assert!(!env.contains_key(COVERAGE_ENV_VAR));
}

#[test]
fn options_env_shape_is_stable() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(TestConfigBuilder::new("test/a.spec.js").build())
        .build();

    let run = prepare(project(), config, args());
    let env = run.launch_plan(&RunContext::default()).env;
    let value: serde_json::Value = serde_json::from_str(env[OPTIONS_ENV_VAR].as_deref().unwrap()).unwrap();

    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["colorDefault", "files", "mochaOpts", "preload"]);
}

#[test]
fn launch_args_then_workspace_then_paths() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(
            TestConfigBuilder::new("test/*.spec.js")
                .launch_arg("--disable-extensions")
                .workspace_folder("fixtures/ws")
                .build(),
        )
        .build();

    let run = prepare(project(), config, args());
    let plan = run.launch_plan(&RunContext::default());

    assert_eq!(
        plan.args,
        vec![
            "--disable-extensions".to_string(),
            "/proj/fixtures/ws".to_string(),
            "--extensionDevelopmentPath=/proj".to_string(),
            format!("--extensionTestsPath={RUNNER_ENTRY}"),
        ]
    );
}

#[test]
fn extension_development_paths_resolve_against_config_dir() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(
            TestConfigBuilder::new("test/*.spec.js")
                .extension_development_path(&["../shared", "."])
                .build(),
        )
        .build();

    let run = prepare(project(), config, args());

    assert_eq!(
        run.description().extension_development_path,
        vec![PathBuf::from("/shared"), PathBuf::from("/proj")]
    );
}

#[test]
fn run_flag_overrides_configured_files() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(TestConfigBuilder::new("test/*.spec.js").build())
        .build();
    let mut args = args();
    args.run = vec![PathBuf::from("test/only.spec.js")];

    let run = prepare(project(), config, args);

    assert_eq!(runner_options(&run).files, vec!["/proj/test/only.spec.js"]);
    assert_eq!(
        run.test().files,
        OneOrMany::Many(vec!["/proj/test/only.spec.js".to_string()])
    );
}

#[test]
fn cli_ignore_filters_test_files() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(TestConfigBuilder::new("test/*.spec.js").build())
        .build();
    let mut args = args();
    args.ignore = vec!["test/only.*".into()];

    let run = prepare(project(), config, args);

    assert_eq!(
        runner_options(&run).files,
        vec!["/proj/test/a.spec.js", "/proj/test/b.spec.js"]
    );
}

#[test]
fn shared_configuration_is_not_mutated() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(
            TestConfigBuilder::new("test/*.spec.js")
                .workspace_folder("ws")
                .build(),
        )
        .build();
    let ctx = prepare_context(project(), config, args());

    let test = &ctx.config.tests()[0];
    let run = DesktopPlatform.prepare(&ctx, 0, test).unwrap().unwrap();

    assert!(ctx.config.tests()[0].launch_args.is_none());
    assert_eq!(run.test().launch_args.as_deref(), Some(&["/proj/ws".to_string()][..]));
}

#[test]
fn coverage_dir_is_added_at_launch() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(TestConfigBuilder::new("test/*.spec.js").build())
        .build();
    let run = prepare(project(), config, args());

    let plan = run.launch_plan(&RunContext {
        coverage_dir: Some(PathBuf::from("/tmp/raw-coverage")),
    });

    assert_eq!(
        plan.env.get(COVERAGE_ENV_VAR),
        Some(&Some("/tmp/raw-coverage".to_string()))
    );
}

#[test]
fn list_configuration_round_trips_launch_plan() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(
            TestConfigBuilder::new("test/*.spec.js")
                .label("unit")
                .workspace_folder("ws")
                .env("A", Some("1"))
                .build(),
        )
        .with_test(TestConfigBuilder::new("test/only.spec.js").label("only").build())
        .build();
    let ctx = prepare_context(project(), config, args());

    let runs = prepare_all(&ctx, &[0, 1]).unwrap();
    let listed = list_configuration(&runs).unwrap();
    let described: Vec<DesktopRunDescription> = serde_json::from_str(&listed).unwrap();
    assert_eq!(described.len(), 2);

    for (index, description) in described.iter().enumerate() {
        let test = &ctx.config.tests()[index];
        let run = DesktopPlatform.prepare(&ctx, index, test).unwrap().unwrap();
        let plan = run.launch_plan(&RunContext::default());

        assert_eq!(description.path, PathBuf::from(CONFIG));
        assert_eq!(&description.config, run.test());
        assert_eq!(description.env, plan.env);
        for dev in &description.extension_development_path {
            assert!(plan.args.contains(&format!("--extensionDevelopmentPath={}", dev.display())));
        }
        assert!(plan.args.contains(&format!(
            "--extensionTestsPath={}",
            description.extension_tests_path.display()
        )));
    }
}

#[test]
fn unknown_platform_is_not_claimed() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(TestConfigBuilder::new("test/*.spec.js").label("w").platform("web").build())
        .build();
    let ctx = prepare_context(project(), config, args());

    assert!(DesktopPlatform.prepare(&ctx, 0, &ctx.config.tests()[0]).unwrap().is_none());

    let err = prepare_all(&ctx, &[0]).unwrap_err();
    assert!(matches!(err, CliError::NoPlatform(ref name) if name.contains('w')));
    assert!(err.is_user_facing());
}

#[test]
fn explicit_desktop_platform_is_claimed() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(TestConfigBuilder::new("test/*.spec.js").platform("desktop").build())
        .build();
    let ctx = prepare_context(project(), config, args());

    assert_eq!(prepare_all(&ctx, &[0]).unwrap().len(), 1);
}

#[test]
fn preparation_fails_fast_on_missing_module() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(TestConfigBuilder::new("test/*.spec.js").build())
        .with_test(TestConfigBuilder::new("test/*.spec.js").preload(&["./nope"]).build())
        .build();
    let ctx = prepare_context(project(), config, args());

    let err = prepare_all(&ctx, &[0, 1]).unwrap_err();

    assert!(matches!(err, CliError::ModuleNotFound { .. }), "{err:?}");
}

#[test]
fn invalid_cli_version_is_rejected() {
    let config = ConfigBuilder::new(CONFIG)
        .with_test(TestConfigBuilder::new("test/*.spec.js").version("stable").build())
        .build();
    let mut args = args();
    args.code_version = Some("newest".into());
    let ctx = prepare_context(project(), config, args);

    let err = prepare_all(&ctx, &[0]).unwrap_err();

    assert!(matches!(err, CliError::InvalidConfig(ref msg) if msg.contains("newest")));
}

#[test]
fn extensions_merge_dependencies_config_and_cli() {
    let fs = project();
    fs.add_file(
        "/proj/package.json",
        r#"{ "extensionDependencies": ["ms-python.python", "Foo.Bar"] }"#,
    );
    let config = ConfigBuilder::new(CONFIG)
        .with_test(
            TestConfigBuilder::new("test/*.spec.js")
                .install_extension("foo.bar@1.2.3")
                .install_extension("x.y")
                .build(),
        )
        .build();
    let mut cli = args();
    cli.install_extensions = vec!["ms-python.python@2.0.0".into()];

    let run = prepare(fs.clone(), config.clone(), cli.clone());
    assert_eq!(
        run.extensions_to_install(),
        vec!["ms-python.python", "Foo.Bar", "x.y"]
    );

    cli.skip_extension_dependencies = true;
    let run = prepare(fs, config, cli);
    assert_eq!(
        run.extensions_to_install(),
        vec!["foo.bar@1.2.3", "x.y", "ms-python.python@2.0.0"]
    );
}

#[test]
fn merge_keeps_first_occurrence_case_insensitively() {
    let merged = merge_extensions([
        vec!["A.b".to_string(), "".to_string()],
        vec!["a.B@1.0.0".to_string(), "c.d".to_string()],
    ]);

    assert_eq!(merged, vec!["A.b", "c.d"]);
}
