//! Server context and the route table. No Hyper plumbing here.

use std::path::PathBuf;

use serde::Serialize;

/// Shared, immutable service state: where uploads and config land, and where
/// the admin UI's static files live. Tests point `storage_root` at a
/// temporary directory instead of the real service root.
pub struct ServiceContext {
    pub storage_root: PathBuf,
    pub static_root: PathBuf,
}

#[derive(Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
}

/// Every explicitly wired route; `GET /*` static fallback excluded.
pub const ROUTES: [RouteInfo; 5] = [
    RouteInfo { method: "POST", path: "/admin/upload-cover" },
    RouteInfo { method: "POST", path: "/admin/upload-event" },
    RouteInfo { method: "POST", path: "/admin/save-config" },
    RouteInfo { method: "GET", path: "/admin/credentials" },
    RouteInfo { method: "GET", path: "/admin/routes" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_table_lists_all_admin_routes() {
        let has = |m: &str, p: &str| ROUTES.iter().any(|r| r.method == m && r.path == p);
        assert!(has("POST", "/admin/upload-cover"));
        assert!(has("POST", "/admin/upload-event"));
        assert!(has("POST", "/admin/save-config"));
        assert!(has("GET", "/admin/credentials"));
        assert!(has("GET", "/admin/routes"));
    }
}
