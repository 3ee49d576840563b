//! Static dispatch table
//!
//! Exact matches win over prefix matches, and among prefixes the longest
//! wins, so the order routes are listed in does not matter.

/// Which upstream origin a route forwards to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Auth,
    Service,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Auth => "auth",
            Backend::Service => "service",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Forward as is
    Proxy(Backend),
    /// Forward only when the session cookie is present; 401 otherwise
    RequireSession(Backend),
    /// Forward to the auth login endpoint and move the token into a cookie
    LoginInterception,
    /// Turn `?token=` into the session cookie and redirect to the frontend
    FederatedCallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    Exact(String),
    Prefix(String),
}

impl PathMatch {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathMatch::Exact(p) => path == p,
            PathMatch::Prefix(p) => path.starts_with(p.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: PathMatch,
    pub behavior: Behavior,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(mut self, path: &str, behavior: Behavior) -> Self {
        self.routes.push(Route {
            path: PathMatch::Exact(path.to_string()),
            behavior,
        });
        self
    }

    pub fn prefix(mut self, prefix: &str, behavior: Behavior) -> Self {
        self.routes.push(Route {
            path: PathMatch::Prefix(prefix.to_string()),
            behavior,
        });
        self
    }

    /// `root` itself and everything below `root/`
    pub fn subtree(self, root: &str, behavior: Behavior) -> Self {
        self.exact(root, behavior)
            .prefix(&format!("{root}/"), behavior)
    }

    /// The most specific route for `path`
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        if let Some(route) = self
            .routes
            .iter()
            .find(|r| matches!(r.path, PathMatch::Exact(_)) && r.path.matches(path))
        {
            return Some(route);
        }

        self.routes
            .iter()
            .filter(|r| matches!(r.path, PathMatch::Prefix(_)) && r.path.matches(path))
            .max_by_key(|r| match &r.path {
                PathMatch::Prefix(p) => p.len(),
                PathMatch::Exact(_) => 0,
            })
    }
}

/// Routes of the deployed application
pub fn default_table() -> RouteTable {
    use Backend::{Auth, Service};
    use Behavior::*;

    RouteTable::new()
        .exact("/", Proxy(Auth))
        .exact("/health", Proxy(Auth))
        .exact("/auth/login", LoginInterception)
        .exact("/auth/callback", FederatedCallback)
        .prefix("/auth/", Proxy(Auth))
        .exact("/api/me", RequireSession(Auth))
        .exact("/api/users/search", Proxy(Auth))
        .subtree("/api/avatars", RequireSession(Service))
        .prefix("/api/subscriptions/", Proxy(Service))
        .prefix("/api/", Proxy(Auth))
        .subtree("/contracts", Proxy(Service))
        .subtree("/friends", Proxy(Service))
        .subtree("/messages", Proxy(Service))
}
