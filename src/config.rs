use std::env;

use crate::api::Credentials;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Runtime configuration, read from the environment (and `.env` via dotenvy
/// in main). Credentials are optional: without them the client behaves like
/// a logged-out session.
pub struct Config {
    pub base_url: String,
    pub credentials: Option<Credentials>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = get("TREEHOLE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let credentials = match (get("TREEHOLE_SESSION_ID"), get("TREEHOLE_CSRF_TOKEN")) {
            (Some(session_id), Some(csrf_token)) => Some(Credentials {
                session_id,
                csrf_token,
            }),
            _ => None,
        };
        Self {
            base_url,
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|value| value.to_string())
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn credentials_require_both_values() {
        let config = Config::from_lookup(lookup(&[("TREEHOLE_SESSION_ID", "abc")]));
        assert!(config.credentials.is_none());

        let config = Config::from_lookup(lookup(&[
            ("TREEHOLE_BASE_URL", "https://treehole.example"),
            ("TREEHOLE_SESSION_ID", "abc"),
            ("TREEHOLE_CSRF_TOKEN", "xyz"),
        ]));
        assert_eq!(config.base_url, "https://treehole.example");
        let creds = config.credentials.unwrap();
        assert_eq!(creds.session_id, "abc");
        assert_eq!(creds.csrf_token, "xyz");
    }
}
