//! Static navigation table
//!
//! Only the by-capital page exists. Every other path redirects to it, and
//! the search query is never part of the path.

use serde::Serialize;

/// Path every unknown location redirects to
pub const DEFAULT_ROUTE: &str = "by-capital";

/// Pages reachable through the navigation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    ByCapital,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::ByCapital => "by-capital",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::ByCapital => "Search by capital",
        }
    }
}

/// Registered routes, in declaration order
pub const ROUTES: &[Route] = &[Route::ByCapital];

/// Outcome of resolving a path against the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Page(Route),
    Redirect(&'static str),
}

/// Resolve a path, ignoring leading and trailing slashes
pub fn resolve(path: &str) -> Resolved {
    let path = path.trim_matches('/');

    ROUTES
        .iter()
        .find(|route| route.path() == path)
        .map(|route| Resolved::Page(*route))
        .unwrap_or(Resolved::Redirect(DEFAULT_ROUTE))
}
