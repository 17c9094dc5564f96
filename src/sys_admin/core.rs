//! Core admin logic: filename resolution, the persistence sink and the
//! config writer. No Hyper types here.

use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncWriteExt};

/// Extensions the event resolver accepts as-is; anything else is rewritten.
const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Fixed base name for the site cover image.
const COVER_BASENAME: &str = "fmi";

/// Where the site configuration lands, relative to the storage root.
pub const SITE_CONFIG_PATH: &str = "assets/site-content.json";

/// Credentials file read by the admin UI, relative to the storage root.
pub const CREDENTIALS_PATH: &str = "assets/admin-credentials.json";

/// Split `name` into (dot position, extension text). A leading dot does not
/// start an extension, so `.gitignore`-style names report none.
fn split_extension(name: &str) -> Option<(usize, &str)> {
    match name.rfind('.') {
        None | Some(0) => None,
        Some(pos) => Some((pos, &name[pos + 1..])),
    }
}

fn extension_allowed(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext))
}

/// Extension to use when a name carries none: the original filename's, if it
/// has one, else `png` when the MIME type mentions png, else `jpg`.
fn derive_extension(original: &str, mime: &str) -> String {
    if let Some((_, ext)) = split_extension(original) {
        if !ext.is_empty() {
            return ext.to_ascii_lowercase();
        }
    }
    if mime.contains("png") { "png".into() } else { "jpg".into() }
}

/// First candidate that is present and non-empty. Keeps the hint priority
/// order in one auditable place.
pub fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates.iter().flatten().copied().find(|s| !s.is_empty())
}

/// Replace every character outside `[A-Za-z0-9._-]` with an underscore.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Resolve the destination name for the cover image: always `fmi.<ext>`,
/// with the extension taken from the original filename when it has one,
/// otherwise guessed from the MIME type.
pub fn resolve_cover_name(original: &str, mime: &str) -> String {
    match split_extension(original) {
        Some((_, ext)) if !ext.is_empty() => {
            format!("{}.{}", COVER_BASENAME, ext.to_ascii_lowercase())
        }
        _ if mime.contains("png") => format!("{}.png", COVER_BASENAME),
        _ => format!("{}.jpg", COVER_BASENAME),
    }
}

/// Resolve a safe destination name for an event image.
///
/// Hints win over the upload's own filename, query hint first. The chosen
/// string is sanitized, given an extension if it lacks one, and forced to
/// `.jpg` if its extension is not a recognized image extension. Never fails:
/// a hint made entirely of disallowed characters just collapses to
/// underscores.
pub fn resolve_event_name(
    query_hint: Option<&str>,
    body_hint: Option<&str>,
    original: &str,
    mime: &str,
) -> String {
    let raw = first_non_empty(&[query_hint, body_hint]).unwrap_or(original);
    let mut name = sanitize(raw);

    if split_extension(&name).is_none() {
        name.push('.');
        name.push_str(&derive_extension(original, mime));
    }

    // An unrecognized extension (e.g. .gif) is dropped, not rejected.
    if let Some((pos, ext)) = split_extension(&name) {
        if !extension_allowed(ext) {
            name.truncate(pos);
            name.push_str(".jpg");
        }
    }

    name.to_ascii_lowercase()
}

/// True when the reported MIME type names an accepted image format.
pub fn mime_accepted(mime: &str) -> bool {
    mime.contains("jpeg") || mime.contains("jpg") || mime.contains("png")
}

/// Write `bytes` to `<root>/<name>`, creating or truncating the file.
/// Last writer wins; there is no temp-file-then-rename step.
pub async fn store_file(root: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(root).await?;
    let path = root.join(name);
    let mut file = fs::File::create(&path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(path)
}

/// Overwrite the site configuration file with `document`, pretty-printed.
/// No merge, no schema check, no backup of the previous version.
pub async fn write_site_config(
    root: &Path,
    document: &serde_json::Value,
) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
    let path = root.join(SITE_CONFIG_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let text = serde_json::to_string_pretty(document)?;
    let mut file = fs::File::create(&path).await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cover_keeps_original_extension_lowercased() {
        assert_eq!(resolve_cover_name("photo.JPG", "image/jpeg"), "fmi.jpg");
        assert_eq!(resolve_cover_name("shot.Png", "image/png"), "fmi.png");
        assert_eq!(resolve_cover_name("pic.jpeg", "application/octet-stream"), "fmi.jpeg");
    }

    #[test]
    fn cover_falls_back_to_mime_then_jpg() {
        assert_eq!(resolve_cover_name("x", "image/png"), "fmi.png");
        assert_eq!(resolve_cover_name("x", "image/webp"), "fmi.jpg");
        assert_eq!(resolve_cover_name("", ""), "fmi.jpg");
    }

    #[test]
    fn first_non_empty_respects_priority_order() {
        assert_eq!(first_non_empty(&[Some("a"), Some("b")]), Some("a"));
        assert_eq!(first_non_empty(&[Some(""), Some("b")]), Some("b"));
        assert_eq!(first_non_empty(&[None, Some("b")]), Some("b"));
        assert_eq!(first_non_empty(&[None, Some("")]), None);
        assert_eq!(first_non_empty(&[]), None);
    }

    #[test]
    fn event_name_contains_only_safe_characters() {
        let name = resolve_event_name(Some("sömé wild/náme?.png"), None, "a.png", "image/png");
        assert!(name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')));
    }

    #[test]
    fn event_unrecognized_extension_becomes_jpg() {
        assert_eq!(
            resolve_event_name(Some("My Event!!.GIF"), None, "photo.gif", "image/gif"),
            "my_event__.jpg"
        );
        assert_eq!(
            resolve_event_name(Some("banner.webp"), None, "banner.webp", "image/webp"),
            "banner.jpg"
        );
    }

    #[test]
    fn event_empty_hint_falls_back_to_original_filename() {
        assert_eq!(
            resolve_event_name(Some(""), None, "banner.PNG", "image/png"),
            "banner.png"
        );
    }

    #[test]
    fn event_body_hint_used_when_query_hint_absent() {
        assert_eq!(
            resolve_event_name(None, Some("Spring Gala.jpg"), "upload.png", "image/png"),
            "spring_gala.jpg"
        );
    }

    #[test]
    fn event_extension_appended_when_hint_has_none() {
        assert_eq!(
            resolve_event_name(Some("gala2026"), None, "photo.PNG", "image/png"),
            "gala2026.png"
        );
        // no original extension either: MIME type decides
        assert_eq!(
            resolve_event_name(Some("gala2026"), None, "photo", "image/png"),
            "gala2026.png"
        );
        assert_eq!(
            resolve_event_name(Some("gala2026"), None, "photo", "image/webp"),
            "gala2026.jpg"
        );
    }

    #[test]
    fn event_all_disallowed_hint_collapses_to_underscores() {
        assert_eq!(
            resolve_event_name(Some("???"), None, "x.jpg", "image/jpeg"),
            "___.jpg"
        );
    }

    #[test]
    fn event_resolution_is_idempotent() {
        let a = resolve_event_name(Some("Fête du parc.GIF"), None, "orig.gif", "image/gif");
        let b = resolve_event_name(Some("Fête du parc.GIF"), None, "orig.gif", "image/gif");
        assert_eq!(a, b);
    }

    #[test]
    fn mime_acceptance() {
        assert!(mime_accepted("image/jpeg"));
        assert!(mime_accepted("image/jpg"));
        assert!(mime_accepted("image/png"));
        assert!(!mime_accepted("image/gif"));
        assert!(!mime_accepted(""));
    }

    #[tokio::test]
    async fn store_file_writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_file(dir.path(), "a.jpg", b"first").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"first");

        store_file(dir.path(), "a.jpg", b"second").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn distinct_names_never_interfere() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = tokio::join!(
            store_file(dir.path(), "a.jpg", b"aaaa"),
            store_file(dir.path(), "b.jpg", b"bbbb"),
        );
        assert_eq!(tokio::fs::read(a.unwrap()).await.unwrap(), b"aaaa");
        assert_eq!(tokio::fs::read(b.unwrap()).await.unwrap(), b"bbbb");
    }

    #[tokio::test]
    async fn config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!({"title": "FMI", "events": [{"name": "gala", "year": 2026}]});
        let path = write_site_config(dir.path(), &doc).await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
        // pretty printer indents nested keys with two spaces
        assert!(text.contains("\n  \"events\""));
    }
}
