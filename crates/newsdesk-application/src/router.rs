//! Named routes of the web front end and their navigation guards.
//!
//! Resolution is pure; [`Router::navigate`] adds the session-dependent
//! guards. Guards run in this order:
//!
//! 1. wait for session restoration when it has not happened yet
//! 2. `requires_auth` without a session → Login, remembering the target
//! 3. `requires_guest` with a session → Home
//! 4. routes addressed by slug reject a blank slug → NotFound

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::session_store::SessionStore;

pub const SITE_NAME: &str = "News Site";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter, strum::IntoStaticStr,
)]
pub enum RouteName {
    Home,
    Login,
    Register,
    Profile,
    ChangePassword,
    Posts,
    PostCreate,
    MyPosts,
    PostDetail,
    PostEdit,
    Categories,
    CategoryPosts,
    MyComments,
    Subscription,
    PaymentSuccess,
    PaymentCancel,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub name: RouteName,
    /// `:name` segments capture one path segment.
    pub pattern: &'static str,
    pub title: &'static str,
    pub requires_auth: bool,
    pub requires_guest: bool,
    /// The `slug` parameter must not be blank.
    pub requires_slug: bool,
}

const fn route(name: RouteName, pattern: &'static str, title: &'static str) -> RouteDef {
    RouteDef {
        name,
        pattern,
        title,
        requires_auth: false,
        requires_guest: false,
        requires_slug: false,
    }
}

const fn auth(def: RouteDef) -> RouteDef {
    RouteDef {
        requires_auth: true,
        ..def
    }
}

const fn guest(def: RouteDef) -> RouteDef {
    RouteDef {
        requires_guest: true,
        ..def
    }
}

const fn slug(def: RouteDef) -> RouteDef {
    RouteDef {
        requires_slug: true,
        ..def
    }
}

/// Declaration order decides between overlapping patterns, so static
/// segments come before their parameterized siblings.
pub const ROUTES: &[RouteDef] = &[
    route(RouteName::Home, "/", "Home"),
    guest(route(RouteName::Login, "/login", "Sign in")),
    guest(route(RouteName::Register, "/register", "Sign up")),
    auth(route(RouteName::Profile, "/profile", "Profile")),
    auth(route(RouteName::ChangePassword, "/change-password", "Change password")),
    route(RouteName::Posts, "/posts", "All posts"),
    auth(route(RouteName::PostCreate, "/posts/create", "Create post")),
    auth(route(RouteName::MyPosts, "/posts/my", "My posts")),
    slug(route(RouteName::PostDetail, "/posts/:slug", "Post")),
    slug(auth(route(RouteName::PostEdit, "/posts/:slug/edit", "Edit post"))),
    route(RouteName::Categories, "/categories", "Categories"),
    slug(route(RouteName::CategoryPosts, "/categories/:slug", "Category posts")),
    auth(route(RouteName::MyComments, "/comments/my", "My comments")),
    auth(route(RouteName::Subscription, "/subscription", "Subscription")),
    route(RouteName::PaymentSuccess, "/subscription/success", "Payment successful"),
    route(RouteName::PaymentCancel, "/subscription/cancel", "Payment cancelled"),
];

const NOT_FOUND: RouteDef = route(RouteName::NotFound, "/:path*", "Page not found");

impl RouteName {
    pub fn definition(self) -> &'static RouteDef {
        ROUTES
            .iter()
            .find(|def| def.name == self)
            .unwrap_or(&NOT_FOUND)
    }

    /// Canonical path; `:slug` is filled from `slug`.
    pub fn path(self, slug: Option<&str>) -> String {
        match self {
            Self::NotFound => "/404".to_string(),
            _ => self
                .definition()
                .pattern
                .replace(":slug", slug.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub name: RouteName,
    /// The path as requested, query included.
    pub full_path: String,
    pub params: BTreeMap<String, String>,
    /// Document title, already suffixed with the site name.
    pub title: String,
}

impl ResolvedRoute {
    pub fn definition(&self) -> &'static RouteDef {
        self.name.definition()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    AuthenticationRequired,
    GuestOnly,
    InvalidSlug,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    Proceed(ResolvedRoute),
    Redirect {
        to: RouteName,
        /// Where to go after signing in.
        redirect: Option<String>,
        reason: RedirectReason,
    },
}

pub fn document_title(title: &str) -> String {
    format!("{} | {}", title, SITE_NAME)
}

/// Matches `path` against [`ROUTES`], falling back to NotFound.
pub fn resolve(path: &str) -> ResolvedRoute {
    let full_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let bare = full_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let bare = match bare.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let (def, params) = ROUTES
        .iter()
        .find_map(|def| match_pattern(def.pattern, bare).map(|params| (def, params)))
        .unwrap_or_else(|| {
            let mut params = BTreeMap::new();
            params.insert("path".to_string(), bare.to_string());
            (&NOT_FOUND, params)
        });

    ResolvedRoute {
        name: def.name,
        full_path,
        params,
        title: document_title(def.title),
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let expected: Vec<&str> = pattern.split('/').collect();
    let actual: Vec<&str> = path.split('/').collect();
    if expected.len() != actual.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (want, got) in expected.iter().zip(actual.iter()) {
        match want.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), (*got).to_string());
            }
            None if want == got => {}
            None => return None,
        }
    }
    Some(params)
}

pub struct Router {
    session: Arc<SessionStore>,
}

impl Router {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub async fn navigate(&self, path: &str) -> Navigation {
        if !self.session.is_initialized() {
            self.session.initialize().await;
        }

        let route = resolve(path);
        let def = route.definition();
        let authenticated = self.session.is_authenticated();

        if def.requires_auth && !authenticated {
            tracing::debug!("[Router] {} needs a session, redirecting to login", route.full_path);
            return Navigation::Redirect {
                to: RouteName::Login,
                redirect: Some(route.full_path),
                reason: RedirectReason::AuthenticationRequired,
            };
        }

        if def.requires_guest && authenticated {
            return Navigation::Redirect {
                to: RouteName::Home,
                redirect: None,
                reason: RedirectReason::GuestOnly,
            };
        }

        if def.requires_slug && route.param("slug").is_none_or(|slug| slug.trim().is_empty()) {
            return Navigation::Redirect {
                to: RouteName::NotFound,
                redirect: None,
                reason: RedirectReason::InvalidSlug,
            };
        }

        Navigation::Proceed(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_static_segments_win_over_slugs() {
        assert_eq!(resolve("/posts/create").name, RouteName::PostCreate);
        assert_eq!(resolve("/posts/my").name, RouteName::MyPosts);
        assert_eq!(resolve("/posts/hello-world").name, RouteName::PostDetail);
        assert_eq!(resolve("/subscription/success").name, RouteName::PaymentSuccess);
    }

    #[test]
    fn test_resolve_extracts_params_and_title() {
        let route = resolve("/posts/hello-world/edit/?tab=preview");
        assert_eq!(route.name, RouteName::PostEdit);
        assert_eq!(route.param("slug"), Some("hello-world"));
        assert_eq!(route.full_path, "/posts/hello-world/edit/?tab=preview");
        assert_eq!(route.title, "Edit post | News Site");
    }

    #[test]
    fn test_unknown_paths_fall_through_to_not_found() {
        let route = resolve("/nowhere/at/all");
        assert_eq!(route.name, RouteName::NotFound);
        assert_eq!(route.title, "Page not found | News Site");
        assert_eq!(resolve("").name, RouteName::Home);
    }

    #[test]
    fn test_every_route_resolves_to_itself() {
        for name in RouteName::iter().filter(|name| *name != RouteName::NotFound) {
            assert_eq!(resolve(&name.path(Some("some-slug"))).name, name, "{}", name);
        }
    }
}
