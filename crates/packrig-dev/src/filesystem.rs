//! The in-memory output of a compiler.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

/// Read access to compiled output. Paths are relative to the output
/// directory and use `/` separators.
pub trait VirtualFileSystem: Send + Sync {
    fn read(&self, path: &str) -> Option<Vec<u8>>;

    fn exists(&self, path: &str) -> bool {
        self.read(path).is_some()
    }

    /// All file paths, sorted
    fn paths(&self) -> Vec<String>;
}

pub type SharedFileSystem = Arc<dyn VirtualFileSystem>;

/// A [`VirtualFileSystem`] compilers can write into while it is being served
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.files.write().insert(normalize(path), content.into());
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.write().remove(&normalize(path))
    }

    pub fn clear(&self) {
        self.files.write().clear();
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().get(&normalize(path)).cloned()
    }

    fn paths(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Content type for a served file, from its extension.
pub fn content_type(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_normalized() {
        let fs = MemoryFileSystem::new();
        fs.write("/assets\\main.js", "console.log(1)");

        assert!(fs.exists("assets/main.js"));
        assert_eq!(fs.read("/assets/main.js").unwrap(), b"console.log(1)");
        assert_eq!(fs.paths(), vec!["assets/main.js"]);

        fs.remove("assets/main.js");
        assert!(fs.is_empty());
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type("main.js"), "application/javascript");
        assert_eq!(content_type("main.js.map"), "application/json");
        assert_eq!(content_type("fonts/a.woff2"), "font/woff2");
        assert_eq!(content_type("LICENSE"), "application/octet-stream");
    }
}
