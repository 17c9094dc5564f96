//! HTTP glue: serve whatever `core::map_static_path` gives us.

use std::path::Path;
use std::str::FromStr;

use hyper::header::CONTENT_TYPE;
use hyper::{Body, Response, StatusCode};
use mime_guess::{Mime, mime};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Try to serve a file for this URI under `base`.
/// Returns `Some(response)` if `uri` maps to a static route, `None` otherwise.
pub async fn handler_static(base: &Path, uri: &str) -> Option<Response<Body>> {
    let path = crate::sys_statichost::core::map_static_path(base, uri)?;
    match File::open(&path).await {
        Ok(file) => {
            let stream = ReaderStream::new(file);
            let mime = Mime::from_str(
                &mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .to_string(),
            )
            .unwrap_or(mime::TEXT_PLAIN);
            Some(
                Response::builder()
                    .header(CONTENT_TYPE, mime.as_ref())
                    .body(Body::wrap_stream(stream))
                    .unwrap(),
            )
        }
        Err(_) => Some(
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Body::from("Not found"))
                .unwrap(),
        ),
    }
}
