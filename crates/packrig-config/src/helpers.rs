use std::path::PathBuf;

// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_src_folder() -> PathBuf {
    PathBuf::from("src")
}

pub(crate) fn default_build_folder() -> PathBuf {
    PathBuf::from("dist")
}

pub(crate) fn default_public_path() -> String {
    "/".to_string()
}

pub(crate) fn default_html_filename() -> String {
    "index.html".to_string()
}

pub(crate) fn default_devtool() -> Option<String> {
    Some("cheap-module-eval-source-map".to_string())
}

pub(crate) fn default_host() -> String {
    "localhost".to_string()
}

pub(crate) fn default_port() -> u16 {
    3000
}

pub(crate) fn default_override_dir() -> PathBuf {
    PathBuf::from("config")
}
