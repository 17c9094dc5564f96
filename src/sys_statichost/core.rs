//! Pure path mapping for the admin UI assets, plus `.html` fallback.

use std::path::{Path, PathBuf};

/// Map a request path to a file under `base`, or `None` when nothing
/// matches. `..` segments are rejected outright.
pub fn map_static_path(base: &Path, uri: &str) -> Option<PathBuf> {
    let rel = uri.strip_prefix('/').unwrap_or(uri);

    if rel.split('/').any(|seg| seg == "..") {
        return None;
    }

    if rel.is_empty() {
        let index = base.join("index.html");
        return index.exists().then_some(index);
    }

    let candidate = base.join(rel);
    if candidate.is_file() {
        return Some(candidate);
    }

    let html_candidate = base.join(format!("{}.html", rel));
    if html_candidate.is_file() {
        return Some(html_candidate);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
        fs::write(dir.path().join("admin.html"), "<html>admin</html>").unwrap();
        fs::write(dir.path().join("style.css"), "body{}").unwrap();
        dir
    }

    #[test]
    fn root_maps_to_index() {
        let dir = fixture();
        assert_eq!(
            map_static_path(dir.path(), "/"),
            Some(dir.path().join("index.html"))
        );
    }

    #[test]
    fn exact_file_and_html_fallback() {
        let dir = fixture();
        assert_eq!(
            map_static_path(dir.path(), "/style.css"),
            Some(dir.path().join("style.css"))
        );
        assert_eq!(
            map_static_path(dir.path(), "/admin"),
            Some(dir.path().join("admin.html"))
        );
    }

    #[test]
    fn missing_file_and_traversal_rejected() {
        let dir = fixture();
        assert_eq!(map_static_path(dir.path(), "/nope.js"), None);
        assert_eq!(map_static_path(dir.path(), "/../secret"), None);
        assert_eq!(map_static_path(dir.path(), "/a/../../b"), None);
    }
}
