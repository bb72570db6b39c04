//! Configuration for the discovery resolver.

use std::time::Duration;

use entity_caps::HashAlgorithm;

/// Configuration for the discovery resolver.
///
/// Controls which entity is treated as the home server, how hashes are
/// recomputed and how long a disco#info query may take.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Domain of the user's own server.
    ///
    /// Replies from this entity additionally drive the feature gate.
    /// Default: None
    pub home_server: Option<String>,

    /// Algorithm used to recompute hashes when the advertisement does not
    /// name one.
    ///
    /// Default: SHA-1
    pub hash_algorithm: HashAlgorithm,

    /// Time to wait for a disco#info reply before giving up.
    ///
    /// None leaves timeouts to the transport.
    /// Default: 30 seconds
    pub query_timeout: Option<Duration>,

    /// Whether concurrent resolutions of the same advertised hash share one
    /// network query.
    ///
    /// Default: true
    pub deduplicate_in_flight: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            home_server: None,
            hash_algorithm: HashAlgorithm::Sha1,
            query_timeout: Some(Duration::from_secs(30)),
            deduplicate_in_flight: true,
        }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the home server domain.
    #[must_use]
    pub fn with_home_server(mut self, domain: impl Into<String>) -> Self {
        self.home_server = Some(domain.into());
        self
    }

    /// Sets the hash algorithm.
    #[must_use]
    pub const fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Sets the query timeout.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Leaves query timeouts entirely to the transport.
    #[must_use]
    pub const fn without_query_timeout(mut self) -> Self {
        self.query_timeout = None;
        self
    }

    /// Enables or disables in-flight de-duplication.
    #[must_use]
    pub const fn with_deduplicate_in_flight(mut self, deduplicate: bool) -> Self {
        self.deduplicate_in_flight = deduplicate;
        self
    }

    /// Returns true if `entity_id` is the configured home server.
    #[must_use]
    pub fn is_home_server(&self, entity_id: &str) -> bool {
        self.home_server
            .as_deref()
            .is_some_and(|home| home.eq_ignore_ascii_case(entity_id))
    }
}
