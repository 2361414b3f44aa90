use std::fmt;

use crate::session::SessionStore;

/// The application's route surface. `Map` and `Review` are session-gated;
/// the rest are public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Signup,
    Map,
    Review { id: String },
}

impl Route {
    /// Parses a location path. Trailing slashes are tolerated; unknown paths
    /// are not routes.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/" => return Some(Route::Landing),
            "/login" => return Some(Route::Login),
            "/signup" => return Some(Route::Signup),
            "/map" => return Some(Route::Map),
            _ => {}
        }

        let id = trimmed.strip_prefix("/review/")?;
        if id.is_empty() || id.contains('/') {
            return None;
        }
        Some(Route::Review { id: id.to_string() })
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Map | Route::Review { .. })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Landing => f.write_str("/"),
            Route::Login => f.write_str("/login"),
            Route::Signup => f.write_str("/signup"),
            Route::Map => f.write_str("/map"),
            Route::Review { id } => write!(f, "/review/{id}"),
        }
    }
}

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Allow(Route),
    RedirectToLogin,
}

/// Pure function of the session flag at navigation time: a gated route with
/// no flag present becomes a redirect to the login view. Presence alone is
/// sufficient; the flag's value is never inspected.
pub fn resolve(route: Route, session: &SessionStore) -> Resolution {
    if route.requires_session() && !session.is_signed_in() {
        return Resolution::RedirectToLogin;
    }
    Resolution::Allow(route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_whole_route_surface() {
        assert_eq!(Route::parse("/"), Some(Route::Landing));
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(Route::parse("/signup"), Some(Route::Signup));
        assert_eq!(Route::parse("/map"), Some(Route::Map));
        assert_eq!(
            Route::parse("/review/abc123"),
            Some(Route::Review { id: "abc123".into() })
        );
        assert_eq!(Route::parse("/review/"), None);
        assert_eq!(Route::parse("/review/a/b"), None);
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn display_round_trips() {
        for path in ["/", "/login", "/signup", "/map", "/review/xyz"] {
            let route = Route::parse(path).unwrap();
            assert_eq!(Route::parse(&route.to_string()), Some(route));
        }
    }

    #[test]
    fn gated_routes_redirect_without_a_session() {
        let session = SessionStore::new();

        assert_eq!(
            resolve(Route::Map, &session),
            Resolution::RedirectToLogin
        );
        assert_eq!(
            resolve(Route::Review { id: "a".into() }, &session),
            Resolution::RedirectToLogin
        );
        assert_eq!(
            resolve(Route::Landing, &session),
            Resolution::Allow(Route::Landing)
        );
        assert_eq!(
            resolve(Route::Login, &session),
            Resolution::Allow(Route::Login)
        );
    }

    #[test]
    fn gated_routes_pass_with_a_session() {
        let session = SessionStore::new();
        session.sign_in("tok");

        assert_eq!(resolve(Route::Map, &session), Resolution::Allow(Route::Map));
    }

    #[test]
    fn logout_regates_the_map() {
        let session = SessionStore::new();
        session.sign_in("tok");
        assert_eq!(resolve(Route::Map, &session), Resolution::Allow(Route::Map));

        session.sign_out();
        assert_eq!(resolve(Route::Map, &session), Resolution::RedirectToLogin);
    }
}
