//! Server loop and router: dispatch requests, stamp CORS headers, log.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use hyper::{
    Body, Method, Request, Response, Server, StatusCode,
    header::CONTENT_TYPE,
    service::{make_service_fn, service_fn},
};

use crate::sys_core::core::{ROUTES, ServiceContext};
use crate::{sys_admin, sys_statichost};

/// Bind and serve until the process is stopped.
pub async fn run_server(port: u16, ctx: Arc<ServiceContext>) {
    let make = make_service_fn(move |_conn| {
        let ctx = ctx.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let ctx = ctx.clone();
                async move { Ok::<_, Infallible>(dispatch(req, &ctx).await) }
            }))
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let server = Server::bind(&addr).serve(make);
    println!("fmi_site_admin listening on http://{}", addr);
    if let Err(e) = server.await {
        eprintln!("server error: {}", e);
    }
}

async fn dispatch(req: Request<Body>, ctx: &ServiceContext) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut resp = route(req, ctx).await;
    apply_cors(&mut resp);
    println!("{} {} -> {}", method, path, resp.status().as_u16());
    resp
}

async fn route(req: Request<Body>, ctx: &ServiceContext) -> Response<Body> {
    if req.method() == Method::OPTIONS {
        return Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Body::empty())
            .unwrap();
    }

    let path = req.uri().path().to_string();
    match (req.method().clone(), path.as_str()) {
        (Method::POST, "/admin/upload-cover") => {
            sys_admin::handlers::handler_upload_cover(req, &ctx.storage_root).await
        }
        (Method::POST, "/admin/upload-event") => {
            sys_admin::handlers::handler_upload_event(req, &ctx.storage_root).await
        }
        (Method::POST, "/admin/save-config") => {
            sys_admin::handlers::handler_save_config(req, &ctx.storage_root).await
        }
        (Method::GET, "/admin/credentials") => {
            sys_admin::handlers::handler_credentials(&ctx.storage_root).await
        }
        (Method::GET, "/admin/routes") => handler_routes(),
        (Method::GET, _) => {
            match sys_statichost::handlers::handler_static(&ctx.static_root, &path).await {
                Some(resp) => resp,
                None => not_found(),
            }
        }
        _ => not_found(),
    }
}

/// GET /admin/routes — list the wired routes as JSON.
fn handler_routes() -> Response<Body> {
    let body = serde_json::to_string(&ROUTES).unwrap_or_else(|_| "[]".into());
    Response::builder()
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn not_found() -> Response<Body> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("Not found"))
        .unwrap()
}

/// Permissive CORS for the admin UI, stamped on every response.
fn apply_cors(resp: &mut Response<Body>) {
    let headers = resp.headers_mut();
    headers.insert("Access-Control-Allow-Origin", "*".parse().unwrap());
    headers.insert(
        "Access-Control-Allow-Methods",
        "GET, POST, OPTIONS".parse().unwrap(),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        "Content-Type".parse().unwrap(),
    );
}
