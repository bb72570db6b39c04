//! Cached capability discovery for XMPP entities.
//!
//! This crate turns the capability hashes entities advertise in presence
//! into full disco#info payloads, querying each distinct hash at most once.
//! It includes:
//!
//! - **Capability cache**: [`CapabilityCache`] keyed by verification hash
//!   over any [`KeyValueStore`]
//! - **Resolver**: [`DiscoveryResolver`] with cache-first lookup, hash
//!   verification, query timeouts and in-flight deduplication
//! - **Entity registry**: [`EntityRegistry`] tracking what each entity can
//!   do now, with change notification
//! - **Feature gate**: [`FeatureGate`] deciding which optional behaviour the
//!   home server allows this session
//! - **Simulation**: [`SimulatedTransport`] and [`MemoryStore`] for tests
//!
//! # Overview
//!
//! Many entities share one client and therefore one capability hash. The
//! cache is keyed by that hash, so a busy roster costs one query per client
//! flavour rather than one per contact:
//!
//! ```text
//! presence ver=H  ->  cache[caps_H]  --hit-->  payload
//!                          |
//!                         miss  ->  disco#info  ->  H' = hash(reply)  ->  cache[caps_H']
//! ```
//!
//! Payloads are stored under the hash recomputed from the reply, so a
//! mistaken or malicious advertisement can never poison the entry for a
//! hash it does not match.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use entity_caps::{DiscoInfo, Identity};
//! use entity_caps_disco::{
//!     DiscoveryResolver, MemoryStore, ResolverConfig, ServerFeature, SimulatedTransport,
//! };
//!
//! # futures::executor::block_on(async {
//! let transport = Arc::new(SimulatedTransport::new());
//! transport.set_reply(
//!     "capulet.lit",
//!     DiscoInfo::new()
//!         .with_identity(Identity::new("server", "im"))
//!         .with_identity(Identity::new("pubsub", "pep")),
//! );
//!
//! let resolver = DiscoveryResolver::new(
//!     ResolverConfig::new()
//!         .with_home_server("capulet.lit")
//!         .without_query_timeout(),
//!     transport,
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! resolver.resolve("capulet.lit", None).await.unwrap();
//! assert!(resolver.feature_gate().is_enabled(ServerFeature::Pep));
//! # });
//! ```
//!
//! # Failure Handling
//!
//! Query errors, error replies and timeouts are logged and counted in
//! [`ResolverStats`]; the resolution itself yields `None` and the entity is
//! treated as having no known capabilities.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod cache;
mod config;
mod error;
mod features;
mod record;
mod registry;
mod resolver;
mod simulation;
mod stats;
mod store;
mod traits;

pub use cache::CapabilityCache;
pub use config::ResolverConfig;
pub use error::DiscoError;
pub use features::{FeatureFlags, FeatureGate, ServerFeature};
pub use record::{DiscoveryRecord, RecordSource};
pub use registry::{CapabilityChange, EntityRegistry};
pub use resolver::DiscoveryResolver;
pub use simulation::SimulatedTransport;
pub use stats::ResolverStats;
pub use store::MemoryStore;
pub use traits::{CapabilityListener, DiscoQuery, DiscoTransport, FeatureEffects, KeyValueStore};
