pub mod cookies;
pub mod legacy;

use serde::Serialize;

use crate::api::{ApiClient, ErrorKind};
use crate::models::{Role, User};
use crate::services::auth;
use self::cookies::{cookie_value, LOGIN_FLAG_COOKIE, ROLE_COOKIE};

const PROTECTED_PREFIXES: [&str; 6] = [
    "/my-booking",
    "/my-mabar",
    "/payment",
    "/profile",
    "/mabar/create",
    "/admin",
];
const GUEST_ONLY: [&str; 2] = ["/login", "/register"];

/// Who the current request belongs to, as far as the front end knows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionContext {
    logged_in: bool,
    role: Option<Role>,
    user: Option<User>,
}

impl SessionContext {
    /// Flags only, without asking the backend.
    pub fn from_cookies(cookie_header: Option<&str>) -> Self {
        let header = cookie_header.unwrap_or("");
        let logged_in = cookie_value(header, LOGIN_FLAG_COOKIE)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let role = if logged_in {
            cookie_value(header, ROLE_COOKIE).and_then(|r| Role::parse(&r))
        } else {
            None
        };
        Self {
            logged_in,
            role,
            user: None,
        }
    }

    /// Read the cookies and, when they claim a login, load the user.
    pub async fn initialize(api: &ApiClient, cookie_header: Option<&str>) -> Self {
        let mut ctx = Self::from_cookies(cookie_header);
        if ctx.logged_in {
            ctx.refresh(api).await;
        }
        ctx
    }

    /// Re-fetch the user. A 401 ends the session; other failures keep the flags.
    pub async fn refresh(&mut self, api: &ApiClient) {
        match auth::me(api).await {
            Ok(user) => {
                self.logged_in = true;
                self.role = Some(user.primary_role());
                self.user = Some(user);
            }
            Err(e) if e.kind() == ErrorKind::Unauthenticated => {
                tracing::info!("session expired");
                *self = Self::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not refresh session");
            }
        }
    }

    /// End the session locally even if the backend call fails.
    pub async fn logout(&mut self, api: &ApiClient) -> Vec<String> {
        if let Err(e) = auth::logout(api).await {
            tracing::warn!(error = %e, "backend logout failed");
        }
        *self = Self::default();
        [LOGIN_FLAG_COOKIE, ROLE_COOKIE, cookies::IDENTITY_COOKIE]
            .iter()
            .map(|name| cookies::build_clear_cookie(name))
            .collect()
    }

    pub fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn home_path(&self) -> &'static str {
        self.role.unwrap_or(Role::User).home_path()
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .map(|rest| rest.starts_with('/') || rest.starts_with('?'))
            .unwrap_or(false)
}

/// Where a page request must be sent instead, if anywhere.
pub fn gate(path: &str, ctx: &SessionContext) -> Option<&'static str> {
    if GUEST_ONLY.iter().any(|p| under(path, p)) {
        return ctx.is_authenticated().then(|| ctx.home_path());
    }
    if !PROTECTED_PREFIXES.iter().any(|p| under(path, p)) {
        return None;
    }
    if !ctx.is_authenticated() {
        return Some("/login");
    }
    if under(path, "/admin") && ctx.role() != Some(Role::Admin) {
        return Some("/");
    }
    None
}
