use std::{env, path::PathBuf, sync::Arc};

use crate::sys_core::core::ServiceContext;

pub mod sys_admin;
pub mod sys_core;
pub mod sys_statichost;

#[tokio::main]
async fn main() {
    let port: u16 = env::var("FMI_ADMIN_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let storage_root = env::var("FMI_ADMIN_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    let static_root = env::var("FMI_ADMIN_STATIC")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("static"));

    let ctx = Arc::new(ServiceContext {
        storage_root,
        static_root,
    });

    // Run the admin server on the configured port.
    sys_core::handlers::run_server(port, ctx).await;
}
