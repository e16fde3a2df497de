pub const DEFAULT_TRANSPORT: &str = "SMTP";
pub const DEFAULT_DESTINATION: &str = "reports@localhost";
pub const DEFAULT_IDENTITY: &str = "ReportRelay";

pub const TRANSPORT_ENV: &str = "RELAY_MAILER";
pub const DESTINATION_ENV: &str = "RELAY_ADDRESS";
pub const IDENTITY_ENV: &str = "RELAY_IDENTITY";

/// Settings consulted while relaying a report.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Selector handed to the mail transport port, e.g. `SMTP`.
    pub transport: String,
    /// Address every report is mailed to.
    pub destination: String,
    /// Name the relay identifies itself with in the audit header.
    pub identity: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            transport: DEFAULT_TRANSPORT.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
            identity: DEFAULT_IDENTITY.to_string(),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves every setting through `lookup`, falling back to the default
    /// when a variable is unset or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let resolve = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            transport: resolve(TRANSPORT_ENV, DEFAULT_TRANSPORT),
            destination: resolve(DESTINATION_ENV, DEFAULT_DESTINATION),
            identity: resolve(IDENTITY_ENV, DEFAULT_IDENTITY),
        }
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }
}
