//! Tests for loading project settings from packrig.toml.

use packrig_config::{
    ConfigurationParams, Environment, Mode, ProjectSettings, ScriptAttribute, SettingsStore,
    Validate,
};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

fn test_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

const SETTINGS: &str = r#"
default_externals = ["react"]
additional_watch = ["views"]

[definitions]
"process.env.API_URL" = "\"https://api.example.com\""

[[copy]]
from = "static"
to = "public"

[targets.web]
environment = "browser"
build_folder = "dist/web"
hot = true
public_path = "/assets/"

[targets.web.css]
modules = true
inject = true

[targets.web.html]
template = "src/index.html"
script_attribute = "async"

[targets.web.dev_server]
integrated = false
port = 4000

[targets.web.entry]
main = ["babel-polyfill", "./src/index.js"]

[targets.api]
environment = "node"
src_folder = "server"
build_folder = "dist/api"
run_on_build = true
exclude_modules = ["lodash"]

[targets.api.entry]
server = ["./server/index.js"]
"#;

#[test]
fn loads_targets_and_project_facts() {
    let _guard = test_lock().lock().expect("lock");
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("packrig.toml"), SETTINGS).expect("write settings");

    let settings = ProjectSettings::load(dir.path()).expect("load settings");
    settings.validate().expect("valid settings");

    let web = settings.require_target("web").expect("web target");
    assert_eq!(web.name, "web");
    assert!(web.is_browser());
    assert!(web.hot);
    assert!(web.css.modules && web.css.inject);
    assert_eq!(web.public_path, "/assets/");
    assert_eq!(
        web.html.as_ref().unwrap().script_attribute,
        ScriptAttribute::Async
    );
    let server = web.dev_server.as_ref().unwrap();
    assert!(!server.integrated);
    assert_eq!(server.port, 4000);
    assert_eq!(server.host, "localhost");
    assert_eq!(web.entry["main"], vec!["babel-polyfill", "./src/index.js"]);

    let api = settings.require_target("api").expect("api target");
    assert_eq!(api.environment, Environment::Node);
    assert_eq!(api.src_folder, PathBuf::from("server"));
    assert!(api.run_on_build);

    assert_eq!(settings.default_externals, vec!["react"]);
    assert_eq!(settings.copy[0].to.as_deref(), Some(PathBuf::from("public").as_path()));
    assert_eq!(settings.override_dir(), dir.path().join("config"));
}

#[test]
fn params_are_gathered_from_settings() {
    let _guard = test_lock().lock().expect("lock");
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("packrig.toml"), SETTINGS).expect("write settings");
    let settings = ProjectSettings::load(dir.path()).expect("load settings");

    let api = settings.require_target("api").unwrap();
    let params = ConfigurationParams::for_target(api, &settings, Mode::Production, Some("abc123"));

    params.validate().expect("valid params");
    assert_eq!(params.output.script, "[name].abc123.js");
    assert_eq!(params.copy.len(), 1);
    assert_eq!(params.additional_watch, vec![PathBuf::from("views")]);
    assert_eq!(params.default_externals, vec!["react"]);
    assert_eq!(
        params.definitions["process.env.API_URL"],
        serde_json::json!("\"https://api.example.com\"")
    );
}

#[test]
fn environment_variables_override_file_values() {
    let _guard = test_lock().lock().expect("lock");
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("packrig.toml"), SETTINGS).expect("write settings");

    unsafe {
        env::set_var("PACKRIG_OVERRIDE_DIR", "overrides");
    }
    let settings = ProjectSettings::load(dir.path());
    unsafe {
        env::remove_var("PACKRIG_OVERRIDE_DIR");
    }

    let settings = settings.expect("load settings");
    assert_eq!(settings.override_dir(), dir.path().join("overrides"));
}

#[test]
fn invalid_settings_are_reported() {
    let _guard = test_lock().lock().expect("lock");
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("packrig.toml"),
        "[targets.web]\nenvironment = \"deno\"\n",
    )
    .expect("write settings");

    let err = ProjectSettings::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("packrig.toml"));
}
