//! Site endpoints and fixed protocol constants.

/// GraphQL endpoint (non-batching variant).
pub const API_URL: &str = "https://members.luscious.net/graphql/nobatch/";

/// Site origin used to absolutize entity paths.
pub const HOME_URL: &str = "https://members.luscious.net";

/// Account login form target.
pub const LOGIN_URL: &str = "https://members.luscious.net/accounts/login/";

/// Phrase the login page contains when credentials are rejected.
pub const LOGIN_FAILURE_PHRASE: &str =
    "The username and/or password you specified are not correct.";

/// Audience filter the site itself sends with every listing query.
pub const AUDIENCE_IDS: &str = "+1+2+3+5+6+8+9+10";

/// Default number of albums per landing-page section.
pub const DEFAULT_LANDING_LIMIT: u32 = 15;

/// The set of URLs a session talks to.
///
/// Production code uses [`Endpoints::default`]; tests point every URL at
/// a mock server with [`Endpoints::with_base`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// GraphQL POST target.
    pub api: String,
    /// Origin joined with relative entity URLs.
    pub home: String,
    /// Login form POST target.
    pub login: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: API_URL.to_string(),
            home: HOME_URL.to_string(),
            login: LOGIN_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Builds endpoints rooted at `base` using the production path layout.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api: format!("{base}/graphql/nobatch/"),
            home: base.to_string(),
            login: format!("{base}/accounts/login/"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_mirrors_production_layout() {
        let endpoints = Endpoints::with_base("http://127.0.0.1:9000/");
        assert_eq!(endpoints.api, "http://127.0.0.1:9000/graphql/nobatch/");
        assert_eq!(endpoints.home, "http://127.0.0.1:9000");
        assert_eq!(endpoints.login, "http://127.0.0.1:9000/accounts/login/");
    }

    #[test]
    fn test_default_endpoints_match_constants() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.api, API_URL);
        assert_eq!(endpoints.home, HOME_URL);
        assert_eq!(endpoints.login, LOGIN_URL);
    }
}
