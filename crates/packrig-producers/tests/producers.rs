//! End-to-end behaviour of the environment producers.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use packrig_config::{
    ConfigError, ConfigurationParams, CopyPattern, DevServerOptions, Environment, Mode,
    PackageInfo, Target,
};
use packrig_producers::browser::{HOT_MIDDLEWARE_CLIENT, HOT_ONLY_DEV_SERVER};
use packrig_producers::{
    BundlerConfig, ConfigFile, ProducerError, ProducerRegistry, Rule, points,
};
use packrig_reducer::ReducerPipeline;
use tempfile::TempDir;

fn registry() -> ProducerRegistry {
    ProducerRegistry::new(Arc::new(ReducerPipeline::empty()), None)
}

fn browser_params() -> ConfigurationParams {
    ConfigurationParams::new(
        Target::new("web", Environment::Browser)
            .with_entry("main", ["babel-polyfill", "./src/index.js"]),
    )
}

fn node_params() -> ConfigurationParams {
    ConfigurationParams::new(
        Target::new("api", Environment::Node).with_entry("server", ["./src/server.js"]),
    )
}

#[test]
fn create_config_is_pure() {
    let registry = registry();
    let params = browser_params();
    let producer = registry
        .producer_for(Environment::Browser, Mode::Production)
        .unwrap();

    let first = producer.get_config(&params).unwrap();
    let second = producer.get_config(&params).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        producer.create_config(&params).unwrap(),
        producer.create_config(&params).unwrap()
    );
}

#[test]
fn handlers_fold_in_registration_order() {
    let pipeline = ReducerPipeline::builder()
        .on(points::BROWSER_CONFIG, |mut config: BundlerConfig, _: &ConfigurationParams| {
            config.devtool = Some("first".to_string());
            Ok(config)
        })
        .on(points::BROWSER_CONFIG, |mut config: BundlerConfig, _: &ConfigurationParams| {
            let seen = config.devtool.take().unwrap_or_default();
            config.devtool = Some(format!("{seen}+second"));
            Ok(config)
        })
        .build();
    let registry = ProducerRegistry::new(Arc::new(pipeline), None);

    let config = registry.build(&browser_params(), Mode::Development).unwrap();
    assert_eq!(config.devtool.as_deref(), Some("first+second"));
}

#[test]
fn specific_points_run_before_generic_ones() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let record = |label: &'static str| {
        let calls = calls.clone();
        move |rules: Vec<Rule>, _: &ConfigurationParams| -> anyhow::Result<Vec<Rule>> {
            calls.lock().unwrap().push(label);
            Ok(rules)
        }
    };

    let pipeline = ReducerPipeline::builder()
        .on("icon-rules", record("generic"))
        .on("icon-rules-for-browser", record("browser"))
        .on("icon-rules-for-node", record("node"))
        .build();
    let registry = ProducerRegistry::new(Arc::new(pipeline), None);

    registry.rules().get_config(&browser_params()).unwrap();
    assert_eq!(*calls.lock().unwrap(), vec!["browser", "generic"]);
}

#[test]
fn caller_entry_is_never_mutated() {
    let mut params = browser_params();
    params.target.hot = true;
    let before = params.entry.clone();

    let config = registry().build(&params, Mode::Development).unwrap();

    assert_eq!(params.entry, before);
    assert_eq!(
        config.entry["main"],
        vec!["babel-polyfill", HOT_MIDDLEWARE_CLIENT, "./src/index.js"]
    );
}

#[test]
fn hot_entries_with_integrated_server_lead_without_polyfill() {
    let mut target = Target::new("web", Environment::Browser)
        .with_entry("main", ["./src/bootstrap.js", "./src/index.js"]);
    target.hot = true;
    target.dev_server = Some(DevServerOptions {
        port: 8080,
        ..DevServerOptions::default()
    });

    let config = registry()
        .build(&ConfigurationParams::new(target), Mode::Development)
        .unwrap();

    assert_eq!(
        config.entry["main"],
        vec![
            "webpack-dev-server/client?http://localhost:8080",
            HOT_ONLY_DEV_SERVER,
            "./src/bootstrap.js",
            "./src/index.js",
        ]
    );
    let server = config.dev_server.unwrap();
    assert!(server.hot);
    assert!(!server.inline);
    assert_eq!(server.public_path.as_deref(), Some("/"));
    assert_eq!(
        config.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
        vec![
            "extract-css",
            "optimize-css",
            "html",
            "script-attributes",
            "hot-module-replacement",
            "named-modules",
            "no-emit-on-errors",
            "define",
        ]
    );
}

#[test]
fn hot_entries_with_integrated_server_follow_polyfill() {
    let mut target = Target::new("web", Environment::Browser)
        .with_entry("main", ["babel-polyfill", "index.js"]);
    target.hot = true;
    target.dev_server = Some(DevServerOptions::default());

    let config = registry()
        .build(&ConfigurationParams::new(target), Mode::Development)
        .unwrap();

    assert_eq!(
        config.entry["main"],
        vec![
            "babel-polyfill",
            "webpack-dev-server/client?http://localhost:3000",
            HOT_ONLY_DEV_SERVER,
            "index.js",
        ]
    );
}

#[test]
fn node_production_externals_respect_allowlist() {
    let mut params = node_params().with_output(packrig_config::OutputTemplates::production("abc"));
    params.default_externals = vec!["react".to_string()];
    params.package = PackageInfo {
        dependencies: vec!["react".into(), "express".into()],
        dev_dependencies: vec!["jest".into()],
    };

    let config = registry().build(&params, Mode::Production).unwrap();
    let externals = config.externals.unwrap();

    assert_eq!(externals.allowlist, vec!["react"]);
    assert!(!externals.dev_dependencies);
    assert_eq!(externals.modules, vec!["express"]);
    assert!(!config.node.unwrap().dirname);
    assert_eq!(config.output.unwrap().library_target.as_deref(), Some("commonjs2"));
}

#[test]
fn node_production_plugins() {
    let mut params = node_params();
    params.copy = vec![CopyPattern {
        from: PathBuf::from("static"),
        to: None,
    }];

    let config = registry().build(&params, Mode::Production).unwrap();
    assert_eq!(
        config.plugin_names(),
        vec!["no-emit-on-errors", "optimize-css", "copy"]
    );

    params.additional_watch = vec![PathBuf::from("views")];
    let config = registry().build(&params, Mode::Production).unwrap();
    assert_eq!(
        config.plugin_names(),
        vec!["no-emit-on-errors", "optimize-css", "copy", "extra-watch"]
    );
}

#[test]
fn node_development_watches_only_when_running() {
    let mut params = node_params();
    let config = registry().build(&params, Mode::Development).unwrap();
    assert_eq!(config.watch, Some(false));
    assert!(!config.has_plugin("run-on-compile"));

    params.target.run_on_build = true;
    let config = registry().build(&params, Mode::Development).unwrap();
    assert_eq!(config.watch, Some(true));
    assert_eq!(
        config.plugin_names(),
        vec!["no-emit-on-errors", "optimize-css", "run-on-compile"]
    );
}

#[test]
fn library_build_skips_page_plugins() {
    let mut params = browser_params();
    params.target.library = true;

    let config = registry().build(&params, Mode::Production).unwrap();
    assert_eq!(
        config.plugin_names(),
        vec!["extract-css", "optimize-css", "define", "minify", "compression"]
    );

    params.target.compress = false;
    let config = registry().build(&params, Mode::Production).unwrap();
    assert!(!config.has_plugin("compression"));
    assert_eq!(config.output.unwrap().library_target.as_deref(), Some("umd"));
}

#[test]
fn application_build_keeps_every_production_plugin() {
    let mut params = browser_params();
    params.target.compress = false;

    let config = registry().build(&params, Mode::Production).unwrap();
    assert_eq!(
        config.plugin_names(),
        vec![
            "extract-css",
            "optimize-css",
            "html",
            "script-attributes",
            "define",
            "minify",
            "compression",
        ]
    );
}

#[test]
fn base_configuration_is_merged_in() {
    let config = registry().build(&browser_params(), Mode::Production).unwrap();
    assert!(!config.rules().is_empty());
    assert_eq!(config.resolve.unwrap().modules, vec!["src", "node_modules"]);
    assert_eq!(config.mode, Some(Mode::Production));
}

#[test]
fn override_file_is_applied() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("web.browser.production.toml"),
        r#"
devtool = "hidden-source-map"

[output]
publicPath = "https://cdn.example.com/"
"#,
    )
    .unwrap();

    let registry = ProducerRegistry::new(
        Arc::new(ReducerPipeline::empty()),
        Some(dir.path().to_path_buf()),
    );
    let config = registry.build(&browser_params(), Mode::Production).unwrap();
    let output = config.output.unwrap();

    assert_eq!(config.devtool.as_deref(), Some("hidden-source-map"));
    assert_eq!(output.public_path.as_deref(), Some("https://cdn.example.com/"));
    assert_eq!(output.path, PathBuf::from("dist"));

    // the development variant has no override file
    let dev = registry.build(&browser_params(), Mode::Development).unwrap();
    assert_eq!(dev.output.unwrap().public_path.as_deref(), Some("/"));
}

#[test]
fn invalid_params_are_rejected_before_building() {
    let mut params = browser_params();
    params.entry.clear();

    let err = registry().build(&params, Mode::Production).unwrap_err();
    assert!(matches!(
        err,
        ProducerError::Config(ConfigError::InvalidParams { ref field, .. }) if field == "entry"
    ));
}

#[test]
fn handler_failure_aborts_the_build() {
    let pipeline = ReducerPipeline::builder()
        .on(
            points::NODE_CONFIG,
            |_: BundlerConfig, _: &ConfigurationParams| -> anyhow::Result<BundlerConfig> {
                anyhow::bail!("refusing to build")
            },
        )
        .build();
    let registry = ProducerRegistry::new(Arc::new(pipeline), None);

    let err = registry.build(&node_params(), Mode::Development).unwrap_err();
    assert!(matches!(err, ProducerError::Reduce(_)));
}
