use std::time::Duration;

/// Environment variable holding the enhancement-backend credential.
pub const API_CREDENTIAL_ENV: &str = "CLARIFY_API_KEY";

/// Options that control how pipeline passes are performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (dashboards, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Credential for the external enhancement backend.
    ///
    /// When `None`, the enhancer always takes its deterministic fallback blend. Absence is a
    /// fully supported configuration, not an error.
    pub api_credential: Option<String>,

    /// How long a single backend call may run before it is treated as failed.
    ///
    /// Expiry is handled exactly like a backend error: the pass falls back to the
    /// deterministic blend.
    pub backend_timeout: Duration,
}

impl Opts {
    /// Build options from the process environment.
    ///
    /// Reads [`API_CREDENTIAL_ENV`]; an unset or blank variable leaves the credential unset.
    pub fn from_env() -> Self {
        let api_credential = std::env::var(API_CREDENTIAL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());

        Self {
            api_credential,
            ..Self::default()
        }
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            api_credential: None,
            backend_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_credential() {
        let opts = Opts::default();
        assert!(opts.api_credential.is_none());
        assert!(opts.backend_timeout > Duration::ZERO);
    }
}
