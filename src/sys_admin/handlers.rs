//! HTTP glue for the admin routes: multipart parsing, JSON responses.

use std::path::Path;

use bytes::Bytes;
use hyper::{Body, Request, Response, StatusCode, body::to_bytes, header::CONTENT_TYPE};
use multer::Multipart;
use serde_json::json;
use tokio_util::io::ReaderStream;

use crate::sys_admin::core;

/// Upper bound on the save-config request body.
const MAX_CONFIG_BYTES: usize = 5 * 1024 * 1024;

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn error_response(status: StatusCode, code: &str) -> Response<Body> {
    json_response(status, json!({ "error": code }))
}

/// One buffered file part: content plus the metadata the resolvers need.
struct FilePart {
    bytes: Bytes,
    original: String,
    mime: String,
}

/// Collect the multipart form: the file part named `file_field`, plus an
/// optional text part named `filename`. Returns `None` when the form is
/// malformed or carries no usable file part.
async fn collect_form(
    req: Request<Body>,
    file_field: &str,
) -> Option<(FilePart, Option<String>)> {
    let ct = req.headers().get(CONTENT_TYPE).and_then(|h| h.to_str().ok())?;
    let boundary = match multer::parse_boundary(ct) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("multipart boundary error: {}", e);
            return None;
        }
    };

    let mut multipart = Multipart::new(req.into_body(), boundary);
    let mut file: Option<FilePart> = None;
    let mut body_hint: Option<String> = None;

    while let Some(field) = multipart.next_field().await.transpose() {
        let field = match field {
            Ok(f) => f,
            Err(e) => {
                eprintln!("multipart error: {}", e);
                return None;
            }
        };
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(n) if n == file_field => {
                let original = field.file_name().unwrap_or_default().to_string();
                let mime = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_default();
                match field.bytes().await {
                    Ok(bytes) => file = Some(FilePart { bytes, original, mime }),
                    Err(e) => {
                        eprintln!("multipart read error: {}", e);
                        return None;
                    }
                }
            }
            Some("filename") => body_hint = field.text().await.ok(),
            // drain unknown parts so the stream can advance
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    Some((file?, body_hint))
}

/// POST /admin/upload-cover — multipart field `cover`, stored as `fmi.<ext>`.
pub async fn handler_upload_cover(req: Request<Body>, root: &Path) -> Response<Body> {
    let Some((file, _)) = collect_form(req, "cover").await else {
        return error_response(StatusCode::BAD_REQUEST, "no file");
    };

    let name = core::resolve_cover_name(&file.original, &file.mime);
    match core::store_file(root, &name, &file.bytes).await {
        Ok(_) => json_response(StatusCode::OK, json!({ "ok": true, "file": name })),
        Err(e) => {
            eprintln!("cover write error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "write_failed")
        }
    }
}

/// POST /admin/upload-event — multipart field `image`; the destination name
/// honors `?filename=`, then the body `filename` part, then the upload's own
/// filename.
pub async fn handler_upload_event(req: Request<Body>, root: &Path) -> Response<Body> {
    let query_hint = req
        .uri()
        .query()
        .and_then(|qs| query_param(qs, "filename"));

    let Some((file, body_hint)) = collect_form(req, "image").await else {
        return error_response(StatusCode::BAD_REQUEST, "no file");
    };

    let name = core::resolve_event_name(
        query_hint.as_deref(),
        body_hint.as_deref(),
        &file.original,
        &file.mime,
    );
    if let Err(e) = core::store_file(root, &name, &file.bytes).await {
        eprintln!("event write error: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "write_failed");
    }

    // Type check runs after the write; the file is already on disk by now.
    if !core::mime_accepted(&file.mime) {
        return error_response(StatusCode::BAD_REQUEST, "invalid_type");
    }

    json_response(StatusCode::OK, json!({ "ok": true, "file": name }))
}

/// POST /admin/save-config — replace the site configuration wholesale.
pub async fn handler_save_config(req: Request<Body>, root: &Path) -> Response<Body> {
    let body = match to_bytes(req.into_body()).await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("config body error: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "write_failed");
        }
    };
    if body.len() > MAX_CONFIG_BYTES {
        return error_response(StatusCode::PAYLOAD_TOO_LARGE, "too_large");
    }

    let document: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("config parse error: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "write_failed");
        }
    };

    match core::write_site_config(root, &document).await {
        Ok(_) => json_response(StatusCode::OK, json!({ "ok": true })),
        Err(e) => {
            eprintln!("config write error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "write_failed")
        }
    }
}

/// GET /admin/credentials — stream the credentials file the admin UI reads.
pub async fn handler_credentials(root: &Path) -> Response<Body> {
    let path = root.join(core::CREDENTIALS_PATH);
    match tokio::fs::File::open(&path).await {
        Ok(file) => {
            let stream = ReaderStream::new(file);
            Response::builder()
                .header(CONTENT_TYPE, "application/json")
                .body(Body::wrap_stream(stream))
                .unwrap()
        }
        Err(_) => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Not found"))
            .unwrap(),
    }
}

/// Look up and percent-decode a single query parameter.
pub fn query_param(qs: &str, key: &str) -> Option<String> {
    qs.split('&').find_map(|pair| {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        let v = it.next().unwrap_or_default();
        if k == key {
            urlencoding::decode(v).ok().map(|s| s.into_owned())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_finds_and_decodes() {
        assert_eq!(
            query_param("filename=My%20Event.jpg&x=1", "filename"),
            Some("My Event.jpg".to_string())
        );
        assert_eq!(query_param("a=1&b=2", "filename"), None);
        assert_eq!(query_param("", "filename"), None);
        assert_eq!(query_param("filename=", "filename"), Some(String::new()));
    }
}
