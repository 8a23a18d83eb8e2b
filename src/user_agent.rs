//! User-Agent selection for the API and media clients.
//!
//! The site rejects obviously scripted agents, so requests present a
//! desktop Chrome identity. Callers either pin a fixed string or let the
//! client pick a plausible Chrome 80-86 build once at construction.

use rand::Rng;
use rand::seq::SliceRandom;

const PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
];

const CHROME_MAJOR_RANGE: std::ops::RangeInclusive<u32> = 80..=86;
const CHROME_BUILD_RANGE: std::ops::RangeInclusive<u32> = 4100..=4200;

/// How the client chooses its User-Agent header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserAgent {
    /// Send exactly this string.
    Fixed(String),
    /// Pick a random desktop Chrome agent once per client.
    #[default]
    RandomChrome,
}

impl UserAgent {
    /// Produces the header value for a new client.
    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::RandomChrome => random_chrome_user_agent(),
        }
    }
}

impl From<String> for UserAgent {
    fn from(value: String) -> Self {
        Self::Fixed(value)
    }
}

impl From<&str> for UserAgent {
    fn from(value: &str) -> Self {
        Self::Fixed(value.to_string())
    }
}

/// Returns a Chrome User-Agent with a random platform, major version and build.
#[must_use]
pub fn random_chrome_user_agent() -> String {
    let mut rng = rand::thread_rng();
    let platform = PLATFORMS.choose(&mut rng).copied().unwrap_or(PLATFORMS[0]);
    let major = rng.gen_range(CHROME_MAJOR_RANGE);
    let build = rng.gen_range(CHROME_BUILD_RANGE);
    let patch = rng.gen_range(0..=200);
    chrome_user_agent(platform, major, build, patch)
}

fn chrome_user_agent(platform: &str, major: u32, build: u32, patch: u32) -> String {
    format!(
        "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/{major}.0.{build}.{patch} Safari/537.36"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_user_agent_is_returned_verbatim() {
        let agent = UserAgent::from("custom-agent/1.0");
        assert_eq!(agent.resolve(), "custom-agent/1.0");
    }

    #[test]
    fn test_random_chrome_version_within_range() {
        for _ in 0..50 {
            let ua = random_chrome_user_agent();
            let version = ua
                .split("Chrome/")
                .nth(1)
                .and_then(|rest| rest.split(' ').next())
                .unwrap();
            let parts: Vec<u32> = version.split('.').map(|p| p.parse().unwrap()).collect();
            assert!(CHROME_MAJOR_RANGE.contains(&parts[0]), "{ua}");
            assert_eq!(parts[1], 0);
            assert!(CHROME_BUILD_RANGE.contains(&parts[2]), "{ua}");
        }
    }

    #[test]
    fn test_default_is_random_chrome() {
        assert_eq!(UserAgent::default(), UserAgent::RandomChrome);
        assert!(UserAgent::default().resolve().starts_with("Mozilla/5.0 ("));
    }
}
