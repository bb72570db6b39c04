//! Capability resolution: cache first, disco#info on miss.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use entity_caps::{CapsAdvertisement, CapsHash, DiscoInfo, HashAlgorithm};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};

use crate::stats::StatsCounters;
use crate::{
    CapabilityCache, DiscoError, DiscoQuery, DiscoTransport, DiscoveryRecord, EntityRegistry,
    FeatureGate, KeyValueStore, RecordSource, ResolverConfig, ResolverStats,
};

type InFlightQuery = Shared<BoxFuture<'static, Result<DiscoInfo, DiscoError>>>;

/// Resolves entities to their capabilities.
///
/// A resolution with an advertised hash is answered from the cache when
/// possible. Otherwise the entity is queried, the reply's hash recomputed,
/// and the payload cached under the recomputed hash, never the advertised
/// one. Resolutions of the home server also update the session's
/// [`FeatureGate`].
///
/// Failures never surface to the caller: an entity whose query fails or
/// times out simply resolves to `None`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use entity_caps::{DiscoInfo, Identity};
/// use entity_caps_disco::{
///     DiscoveryResolver, MemoryStore, RecordSource, ResolverConfig, SimulatedTransport,
/// };
///
/// # futures::executor::block_on(async {
/// let transport = Arc::new(SimulatedTransport::new());
/// transport.set_reply(
///     "juliet@capulet.lit/balcony",
///     DiscoInfo::new()
///         .with_identity(Identity::new("client", "web").with_name("Jappix"))
///         .with_feature("urn:xmpp:ping"),
/// );
///
/// let resolver = DiscoveryResolver::new(
///     ResolverConfig::default().without_query_timeout(),
///     transport.clone(),
///     Arc::new(MemoryStore::new()),
/// );
///
/// let advertised = Some("KbjoKEv4QbJOdAIvOZg+6mxiLRo=");
/// let first = resolver.resolve("juliet@capulet.lit/balcony", advertised).await.unwrap();
/// let second = resolver.resolve("juliet@capulet.lit/balcony", advertised).await.unwrap();
///
/// assert_eq!(first.source(), RecordSource::Network);
/// assert_eq!(second.source(), RecordSource::Cache);
/// assert_eq!(transport.query_count(), 1);
/// # });
/// ```
pub struct DiscoveryResolver {
    config: ResolverConfig,
    transport: Arc<dyn DiscoTransport>,
    cache: CapabilityCache,
    registry: Arc<EntityRegistry>,
    gate: Arc<FeatureGate>,
    /// Capability hash -> query already on the wire for it
    in_flight: Mutex<HashMap<CapsHash, InFlightQuery>>,
    stats: StatsCounters,
}

impl DiscoveryResolver {
    /// Creates a resolver with its own registry and feature gate.
    #[must_use]
    pub fn new(
        config: ResolverConfig,
        transport: Arc<dyn DiscoTransport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_parts(
            config,
            transport,
            store,
            Arc::new(EntityRegistry::new()),
            Arc::new(FeatureGate::new()),
        )
    }

    /// Creates a resolver that reports into an existing registry and gate.
    #[must_use]
    pub fn with_parts(
        config: ResolverConfig,
        transport: Arc<dyn DiscoTransport>,
        store: Arc<dyn KeyValueStore>,
        registry: Arc<EntityRegistry>,
        gate: Arc<FeatureGate>,
    ) -> Self {
        Self {
            config,
            transport,
            cache: CapabilityCache::new(store),
            registry,
            gate,
            in_flight: Mutex::new(HashMap::new()),
            stats: StatsCounters::default(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the capability cache.
    #[must_use]
    pub const fn cache(&self) -> &CapabilityCache {
        &self.cache
    }

    /// Returns the entity registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// Returns the session's feature gate.
    #[must_use]
    pub fn feature_gate(&self) -> &Arc<FeatureGate> {
        &self.gate
    }

    /// Returns a snapshot of the resolver counters.
    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        self.stats.snapshot()
    }

    /// Resolves `entity_id` to its capabilities.
    ///
    /// `advertised_hash` is the `ver` the entity advertised in presence; an
    /// absent or blank value means the entity is queried directly and the
    /// result is not cached. The configured hash algorithm is used to verify
    /// replies.
    ///
    /// Returns `None` if the query fails or times out.
    pub async fn resolve(
        &self,
        entity_id: &str,
        advertised_hash: Option<&str>,
    ) -> Option<DiscoveryRecord> {
        let advertised = advertised_hash.and_then(|ver| CapsHash::parse(ver).ok());
        self.resolve_with(
            entity_id,
            advertised.as_ref(),
            None,
            self.config.hash_algorithm,
        )
        .await
    }

    /// Resolves `entity_id` from a parsed presence advertisement.
    ///
    /// The query is addressed to the advertised `node#ver` and the reply is
    /// verified with the advertised hash algorithm.
    ///
    /// Returns `None` if the query fails or times out.
    pub async fn resolve_advertisement(
        &self,
        entity_id: &str,
        advertisement: &CapsAdvertisement,
    ) -> Option<DiscoveryRecord> {
        self.resolve_with(
            entity_id,
            Some(advertisement.ver()),
            Some(advertisement.disco_node()),
            advertisement.hash_algorithm(),
        )
        .await
    }

    /// Forgets an entity's current capabilities, e.g. when it goes
    /// unavailable. The cache is left untouched.
    pub fn forget(&self, entity_id: &str) -> Option<DiscoveryRecord> {
        self.registry.remove(entity_id)
    }

    /// Starts a new session: clears server feature flags and per-entity
    /// state. Cached payloads survive across sessions.
    pub fn start_session(&self) {
        self.gate.reset();
        self.registry.clear();
        info!("capability session reset");
    }

    async fn resolve_with(
        &self,
        entity_id: &str,
        advertised: Option<&CapsHash>,
        node: Option<String>,
        algorithm: HashAlgorithm,
    ) -> Option<DiscoveryRecord> {
        match self.try_resolve(entity_id, advertised, node, algorithm).await {
            Ok(record) => {
                self.publish(&record);
                Some(record)
            }
            Err(err) => {
                self.stats.failure();
                warn!(entity = %entity_id, error = %err, "capability resolution failed");
                None
            }
        }
    }

    async fn try_resolve(
        &self,
        entity_id: &str,
        advertised: Option<&CapsHash>,
        node: Option<String>,
        algorithm: HashAlgorithm,
    ) -> Result<DiscoveryRecord, DiscoError> {
        let Some(advertised) = advertised else {
            let info = self.query(entity_id, node).await?;
            return Ok(DiscoveryRecord::new(
                entity_id,
                None,
                info,
                RecordSource::Network,
            ));
        };

        if let Some(info) = self.cache.get(advertised) {
            self.stats.cache_hit();
            debug!(entity = %entity_id, hash = %advertised, "capabilities served from cache");
            return Ok(DiscoveryRecord::new(
                entity_id,
                Some(advertised.clone()),
                info,
                RecordSource::Cache,
            ));
        }

        self.stats.cache_miss();
        debug!(entity = %entity_id, hash = %advertised, "capability cache miss");
        let info = self.query_once(entity_id, advertised, node).await?;

        let computed = info.verification_hash(algorithm);
        if computed != *advertised {
            self.stats.hash_mismatch();
            warn!(
                entity = %entity_id,
                advertised = %advertised,
                computed = %computed,
                "advertised capability hash does not match reply"
            );
        }

        if let Err(err) = self.cache.put(&computed, &info) {
            warn!(hash = %computed, error = %err, "failed to cache capabilities");
        }

        Ok(DiscoveryRecord::new(
            entity_id,
            Some(computed),
            info,
            RecordSource::Network,
        ))
    }

    /// Queries for `hash`, joining a query already in flight for it.
    ///
    /// A joiner whose shared query fails asks its own entity instead, so
    /// another entity's error or silence never decides this resolution.
    async fn query_once(
        &self,
        entity_id: &str,
        hash: &CapsHash,
        mut node: Option<String>,
    ) -> Result<DiscoInfo, DiscoError> {
        if !self.config.deduplicate_in_flight {
            return self.query(entity_id, node).await;
        }

        let (pending, joined) = {
            let mut in_flight = self.in_flight.lock().expect("lock poisoned");
            if let Some(existing) = in_flight.get(hash) {
                (existing.clone(), true)
            } else {
                self.stats.query_sent();
                let pending = send(
                    Arc::clone(&self.transport),
                    DiscoQuery::new(entity_id, node.take()),
                    self.config.query_timeout,
                )
                .boxed()
                .shared();
                in_flight.insert(hash.clone(), pending.clone());
                (pending, false)
            }
        };

        if joined {
            self.stats.query_deduplicated();
            debug!(entity = %entity_id, hash = %hash, "joining in-flight query");
        }

        // Dropped on completion or cancellation alike.
        let entry = InFlightEntry {
            in_flight: &self.in_flight,
            hash,
            pending,
        };
        let result = entry.pending.clone().await;
        drop(entry);

        match result {
            Err(err) if joined => {
                debug!(
                    entity = %entity_id,
                    hash = %hash,
                    error = %err,
                    "shared query failed, asking entity directly"
                );
                self.query(entity_id, node).await
            }
            result => result,
        }
    }

    async fn query(&self, entity_id: &str, node: Option<String>) -> Result<DiscoInfo, DiscoError> {
        self.stats.query_sent();
        send(
            Arc::clone(&self.transport),
            DiscoQuery::new(entity_id, node),
            self.config.query_timeout,
        )
        .await
    }

    fn publish(&self, record: &DiscoveryRecord) {
        self.registry.record(record);
        if self.config.is_home_server(record.entity_id()) {
            let flags = self.gate.apply_server_features(record.payload());
            debug!(server = %record.entity_id(), flags = ?flags, "server features updated");
        }
    }
}

/// Removes a hash's in-flight query once a resolution waiting on it is done.
struct InFlightEntry<'a> {
    in_flight: &'a Mutex<HashMap<CapsHash, InFlightQuery>>,
    hash: &'a CapsHash,
    pending: InFlightQuery,
}

impl Drop for InFlightEntry<'_> {
    fn drop(&mut self) {
        let Ok(mut in_flight) = self.in_flight.lock() else {
            return;
        };
        if in_flight
            .get(self.hash)
            .is_some_and(|current| current.ptr_eq(&self.pending))
        {
            in_flight.remove(self.hash);
        }
    }
}

async fn send(
    transport: Arc<dyn DiscoTransport>,
    query: DiscoQuery,
    limit: Option<Duration>,
) -> Result<DiscoInfo, DiscoError> {
    debug!(id = %query.id(), to = %query.to(), node = ?query.node(), "sending disco#info query");
    let reply = transport.query_info(&query);
    match limit {
        Some(limit) => tokio::time::timeout(limit, reply)
            .await
            .map_err(|_| DiscoError::timeout(query.to()))?,
        None => reply.await,
    }
}

impl fmt::Debug for DiscoveryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryResolver")
            .field("config", &self.config)
            .field("registry_entries", &self.registry.len())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
