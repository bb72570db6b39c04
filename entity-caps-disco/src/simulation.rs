//! Scripted transport for tests and evaluation.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use entity_caps::DiscoInfo;
use tracing::trace;

use crate::{DiscoError, DiscoQuery, DiscoTransport};

#[derive(Debug, Clone)]
enum Reply {
    Info(DiscoInfo),
    Error(DiscoError),
    Silent,
}

/// In-process [`DiscoTransport`] that answers from a script.
///
/// Each entity is scripted to reply with a payload, an error, or nothing at
/// all. Unscripted entities answer `service-unavailable`. Every query is
/// logged so tests can assert on network traffic.
///
/// # Examples
///
/// ```
/// use entity_caps::{DiscoInfo, Identity};
/// use entity_caps_disco::{DiscoQuery, DiscoTransport, SimulatedTransport};
///
/// let transport = SimulatedTransport::new();
/// transport.set_reply(
///     "juliet@capulet.lit/balcony",
///     DiscoInfo::new().with_identity(Identity::new("client", "pc")),
/// );
///
/// let query = DiscoQuery::new("juliet@capulet.lit/balcony", None);
/// let reply = futures::executor::block_on(transport.query_info(&query)).unwrap();
///
/// assert!(reply.has_identity("client", "pc"));
/// assert_eq!(transport.query_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    /// Entity identifier -> scripted reply
    replies: RwLock<HashMap<String, Reply>>,
    /// Every query received, in order
    log: RwLock<Vec<DiscoQuery>>,
    /// Delay before answering
    latency: Option<Duration>,
}

impl SimulatedTransport {
    /// Creates a transport that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that waits `latency` before each reply.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Scripts `entity_id` to answer with `info`.
    ///
    /// The reply echoes the node of the query it answers.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_reply(&self, entity_id: impl Into<String>, info: DiscoInfo) {
        self.script(entity_id.into(), Reply::Info(info));
    }

    /// Scripts `entity_id` to fail with `error`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_error(&self, entity_id: impl Into<String>, error: DiscoError) {
        self.script(entity_id.into(), Reply::Error(error));
    }

    /// Scripts `entity_id` to never answer.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_silent(&self, entity_id: impl Into<String>) {
        self.script(entity_id.into(), Reply::Silent);
    }

    fn script(&self, entity_id: String, reply: Reply) {
        self.replies
            .write()
            .expect("lock poisoned")
            .insert(entity_id, reply);
    }

    /// Returns the number of queries received.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.log.read().expect("lock poisoned").len()
    }

    /// Returns every query received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn queries(&self) -> Vec<DiscoQuery> {
        self.log.read().expect("lock poisoned").clone()
    }

    /// Returns the queries sent to `entity_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn queries_to(&self, entity_id: &str) -> Vec<DiscoQuery> {
        self.log
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|query| query.to() == entity_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DiscoTransport for SimulatedTransport {
    async fn query_info(&self, query: &DiscoQuery) -> Result<DiscoInfo, DiscoError> {
        self.log
            .write()
            .expect("lock poisoned")
            .push(query.clone());
        let reply = self
            .replies
            .read()
            .expect("lock poisoned")
            .get(query.to())
            .cloned();

        trace!(id = %query.id(), to = %query.to(), "simulated disco#info query");

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Some(Reply::Info(info)) => Ok(match query.node() {
                Some(node) => info.with_node(node),
                None => DiscoInfo { node: None, ..info },
            }),
            Some(Reply::Error(error)) => Err(error),
            Some(Reply::Silent) => futures::future::pending().await,
            None => Err(DiscoError::error_reply(query.to(), "service-unavailable")),
        }
    }
}

#[cfg(test)]
mod tests {
    use entity_caps::Identity;
    use futures::executor::block_on;

    use super::*;

    fn ask(transport: &SimulatedTransport, to: &str, node: Option<&str>) -> Result<DiscoInfo, DiscoError> {
        block_on(transport.query_info(&DiscoQuery::new(to, node.map(str::to_string))))
    }

    #[test]
    fn scripted_reply_echoes_node() {
        let transport = SimulatedTransport::new();
        transport.set_reply(
            "juliet@capulet.lit/balcony",
            DiscoInfo::new().with_identity(Identity::new("client", "pc")),
        );

        let reply = ask(&transport, "juliet@capulet.lit/balcony", Some("http://psi-im.org#q07I")).unwrap();
        assert_eq!(reply.node.as_deref(), Some("http://psi-im.org#q07I"));

        let reply = ask(&transport, "juliet@capulet.lit/balcony", None).unwrap();
        assert!(reply.node.is_none());
    }

    #[test]
    fn unscripted_entity_is_unavailable() {
        let transport = SimulatedTransport::new();
        let err = ask(&transport, "nobody@example.com", None).unwrap_err();
        assert_eq!(
            err,
            DiscoError::error_reply("nobody@example.com", "service-unavailable")
        );
    }

    #[test]
    fn scripted_error() {
        let transport = SimulatedTransport::new();
        transport.set_error("capulet.lit", DiscoError::transport("capulet.lit", "disconnected"));
        assert!(matches!(
            ask(&transport, "capulet.lit", None),
            Err(DiscoError::Transport { .. })
        ));
    }

    #[test]
    fn log_records_every_query() {
        let transport = SimulatedTransport::new();
        let _ = ask(&transport, "a@example.com", None);
        let _ = ask(&transport, "b@example.com", None);
        let _ = ask(&transport, "a@example.com", None);

        assert_eq!(transport.query_count(), 3);
        assert_eq!(transport.queries_to("a@example.com").len(), 2);
        assert_eq!(transport.queries()[1].to(), "b@example.com");
    }
}
