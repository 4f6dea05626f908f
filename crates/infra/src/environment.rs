//! System environment probe
//!
//! Desktop analog of the browser capturing environment: a user-agent string
//! composed from the application identity and the host platform, plus an
//! optional location the embedding application keeps current.

use beacon_core::ports::EnvironmentProbe;
use beacon_domain::Environment;
use parking_lot::RwLock;

/// Environment probe describing the running application and host
pub struct SystemEnvironment {
    user_agent: String,
    url: RwLock<Option<String>>,
}

impl SystemEnvironment {
    /// Build a probe for the given application identity
    pub fn new(app_name: &str, app_version: &str) -> Self {
        let user_agent = format!(
            "{app_name}/{app_version} ({} {})",
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        Self { user_agent, url: RwLock::new(None) }
    }

    /// Seed the current location
    pub fn with_url(self, url: impl Into<String>) -> Self {
        *self.url.write() = Some(url.into());
        self
    }

    /// Update the current location (e.g. active route or view)
    pub fn set_url(&self, url: Option<String>) {
        *self.url.write() = url;
    }
}

impl EnvironmentProbe for SystemEnvironment {
    fn capture(&self) -> Environment {
        Environment { user_agent: self.user_agent.clone(), url: self.url.read().clone() }
    }
}
