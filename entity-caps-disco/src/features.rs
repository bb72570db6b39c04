//! Server feature gating.
//!
//! The home server's disco#info reply decides which optional client
//! behaviour is available for the session: PEP-based extras, server-side
//! message archiving, ad-hoc commands and so on. [`FeatureGate`] holds that
//! decision as an explicit per-session context instead of global flags.

use std::fmt;
use std::sync::{Arc, RwLock};

use bitflags::bitflags;
use entity_caps::DiscoInfo;
use tracing::{info, trace};

use crate::FeatureEffects;

bitflags! {
    /// Server features known to be available in the current session.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureFlags: u16 {
        /// Personal Eventing Protocol (XEP-0163)
        const PEP = 1 << 0;
        /// Publish-Subscribe (XEP-0060)
        const PUBSUB = 1 << 1;
        /// Message archiving (XEP-0136)
        const ARCHIVE = 1 << 2;
        /// Automatic archiving
        const ARCHIVE_AUTO = 1 << 3;
        /// Archive management
        const ARCHIVE_MANAGE = 1 << 4;
        /// Manual archiving
        const ARCHIVE_MANUAL = 1 << 5;
        /// Archiving preferences
        const ARCHIVE_PREF = 1 << 6;
        /// Ad-Hoc Commands (XEP-0050)
        const COMMANDS = 1 << 7;
        /// Message delivery receipts (XEP-0184)
        const RECEIPTS = 1 << 8;
        /// XHTML-IM (XEP-0071)
        const XHTML_IM = 1 << 9;
    }
}

/// A server feature tracked by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerFeature {
    /// PEP, signalled by a `pubsub/pep` identity
    Pep,
    /// `http://jabber.org/protocol/pubsub`
    PubSub,
    /// `urn:xmpp:archive`
    Archive,
    /// `urn:xmpp:archive:auto`
    ArchiveAuto,
    /// `urn:xmpp:archive:manage`
    ArchiveManage,
    /// `urn:xmpp:archive:manual`
    ArchiveManual,
    /// `urn:xmpp:archive:pref`
    ArchivePref,
    /// `http://jabber.org/protocol/commands`
    Commands,
    /// `urn:xmpp:receipts`
    Receipts,
    /// `http://jabber.org/protocol/xhtml-im`
    XhtmlIm,
}

impl ServerFeature {
    /// Every tracked feature, in notification order.
    pub const ALL: [Self; 10] = [
        Self::Pep,
        Self::PubSub,
        Self::Archive,
        Self::ArchiveAuto,
        Self::ArchiveManage,
        Self::ArchiveManual,
        Self::ArchivePref,
        Self::Commands,
        Self::Receipts,
        Self::XhtmlIm,
    ];

    /// Identity category and type that signal PEP support.
    pub const PEP_IDENTITY: (&'static str, &'static str) = ("pubsub", "pep");

    /// Returns the feature namespace, or None for PEP which is detected by
    /// identity.
    #[must_use]
    pub const fn namespace(self) -> Option<&'static str> {
        match self {
            Self::Pep => None,
            Self::PubSub => Some("http://jabber.org/protocol/pubsub"),
            Self::Archive => Some("urn:xmpp:archive"),
            Self::ArchiveAuto => Some("urn:xmpp:archive:auto"),
            Self::ArchiveManage => Some("urn:xmpp:archive:manage"),
            Self::ArchiveManual => Some("urn:xmpp:archive:manual"),
            Self::ArchivePref => Some("urn:xmpp:archive:pref"),
            Self::Commands => Some("http://jabber.org/protocol/commands"),
            Self::Receipts => Some("urn:xmpp:receipts"),
            Self::XhtmlIm => Some("http://jabber.org/protocol/xhtml-im"),
        }
    }

    /// Returns the flag bit for this feature.
    #[must_use]
    pub const fn flag(self) -> FeatureFlags {
        match self {
            Self::Pep => FeatureFlags::PEP,
            Self::PubSub => FeatureFlags::PUBSUB,
            Self::Archive => FeatureFlags::ARCHIVE,
            Self::ArchiveAuto => FeatureFlags::ARCHIVE_AUTO,
            Self::ArchiveManage => FeatureFlags::ARCHIVE_MANAGE,
            Self::ArchiveManual => FeatureFlags::ARCHIVE_MANUAL,
            Self::ArchivePref => FeatureFlags::ARCHIVE_PREF,
            Self::Commands => FeatureFlags::COMMANDS,
            Self::Receipts => FeatureFlags::RECEIPTS,
            Self::XhtmlIm => FeatureFlags::XHTML_IM,
        }
    }

    /// Returns true if `info` advertises this feature.
    #[must_use]
    pub fn is_advertised(self, info: &DiscoInfo) -> bool {
        match self.namespace() {
            Some(namespace) => info.has_feature(namespace),
            None => {
                let (category, kind) = Self::PEP_IDENTITY;
                info.has_identity(category, kind)
            }
        }
    }
}

impl fmt::Display for ServerFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace() {
            Some(namespace) => f.write_str(namespace),
            None => f.write_str("pep"),
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl FeatureFlags {
    /// Computes the flags a disco#info reply enables.
    #[must_use]
    pub fn from_disco_info(info: &DiscoInfo) -> Self {
        ServerFeature::ALL
            .into_iter()
            .filter(|feature| feature.is_advertised(info))
            .fold(Self::empty(), |flags, feature| flags | feature.flag())
    }

    /// Returns true if `feature` is enabled.
    #[must_use]
    pub const fn has(self, feature: ServerFeature) -> bool {
        self.contains(feature.flag())
    }

    /// Returns true if any message archiving variant is enabled.
    #[must_use]
    pub const fn supports_archiving(self) -> bool {
        self.intersects(
            Self::ARCHIVE
                .union(Self::ARCHIVE_AUTO)
                .union(Self::ARCHIVE_MANAGE)
                .union(Self::ARCHIVE_MANUAL)
                .union(Self::ARCHIVE_PREF),
        )
    }
}

/// Per-session holder of the server's feature flags.
///
/// Flags start cleared, are replaced wholesale each time the home server's
/// capabilities are applied, and are cleared again by [`reset`](Self::reset)
/// when a new session starts.
///
/// # Examples
///
/// ```
/// use entity_caps::DiscoInfo;
/// use entity_caps_disco::{FeatureGate, ServerFeature};
///
/// let gate = FeatureGate::new();
/// gate.apply_server_features(
///     &DiscoInfo::new().with_feature("http://jabber.org/protocol/pubsub"),
/// );
///
/// assert!(gate.is_enabled(ServerFeature::PubSub));
/// assert!(!gate.is_enabled(ServerFeature::Commands));
/// ```
#[derive(Default)]
pub struct FeatureGate {
    flags: RwLock<FeatureFlags>,
    effects: RwLock<Vec<Arc<dyn FeatureEffects>>>,
}

impl FeatureGate {
    /// Creates a gate with every feature disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a collaborator to be told about every applied feature.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_effects(&self, effects: Arc<dyn FeatureEffects>) {
        self.effects.write().expect("lock poisoned").push(effects);
    }

    /// Replaces the flags with those advertised by the home server and runs
    /// every registered effect for every tracked feature.
    ///
    /// Effects run on every call, even when nothing changed.
    ///
    /// # Panics
    ///
    /// Panics if any of the internal locks are poisoned.
    pub fn apply_server_features(&self, info: &DiscoInfo) -> FeatureFlags {
        let flags = FeatureFlags::from_disco_info(info);
        *self.flags.write().expect("lock poisoned") = flags;
        info!(flags = ?flags, "applied server features");

        let effects = self.effects.read().expect("lock poisoned").clone();
        for feature in ServerFeature::ALL {
            let enabled = flags.has(feature);
            trace!(%feature, enabled, "dispatching feature effect");
            for effect in &effects {
                effect.feature_toggled(feature, enabled);
            }
        }
        flags
    }

    /// Returns the current flags.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn flags(&self) -> FeatureFlags {
        *self.flags.read().expect("lock poisoned")
    }

    /// Returns true if `feature` is currently enabled.
    #[must_use]
    pub fn is_enabled(&self, feature: ServerFeature) -> bool {
        self.flags().has(feature)
    }

    /// Clears every flag for a new session. Effects are not invoked.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reset(&self) {
        *self.flags.write().expect("lock poisoned") = FeatureFlags::empty();
    }
}

impl fmt::Debug for FeatureGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureGate")
            .field("flags", &self.flags())
            .finish_non_exhaustive()
    }
}
