//! Prefix-filtered state-update subscriptions.
//!
//! A [`Subscription`] pairs an object-path prefix with the channel its
//! matching [`StateUpdate`]s are delivered on. [`SubscriptionSet`] is the
//! client-side registry that resolves which subscribers an update fans out
//! to.

use std::collections::BTreeMap;
use std::fmt;

use tokio::sync::mpsc;

use super::StateUpdate;

/// Opaque identifier returned by subscribe and consumed by unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A request to receive updates for objects whose path starts with
/// `filter_prefix`. An empty prefix matches every object.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Object-path prefix to match.
    pub filter_prefix: String,
    /// Channel matching updates are delivered on.
    pub sender: mpsc::Sender<StateUpdate>,
}

impl Subscription {
    /// Creates a subscription delivering to `sender`.
    #[must_use]
    pub fn new(filter_prefix: impl Into<String>, sender: mpsc::Sender<StateUpdate>) -> Self {
        Self {
            filter_prefix: filter_prefix.into(),
            sender,
        }
    }

    /// Returns `true` if updates for `object` belong to this subscription.
    #[must_use]
    pub fn matches(&self, object: &str) -> bool {
        object.starts_with(&self.filter_prefix)
    }
}

/// Registry of active subscriptions, keyed by [`SubscriptionId`].
///
/// Owned by a single task; iteration follows registration order so fan-out
/// is deterministic.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    entries: BTreeMap<SubscriptionId, Subscription>,
    next_id: u64,
}

impl SubscriptionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscription and returns its identifier.
    pub fn insert(&mut self, subscription: Subscription) -> SubscriptionId {
        self.next_id = self.next_id.saturating_add(1);
        let id = SubscriptionId(self.next_id);
        self.entries.insert(id, subscription);
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Returns the senders of every subscription matching `object`.
    #[must_use]
    pub fn matching(&self, object: &str) -> Vec<mpsc::Sender<StateUpdate>> {
        self.entries
            .values()
            .filter(|s| s.matches(object))
            .map(|s| s.sender.clone())
            .collect()
    }

    /// Drops every subscription, closing their channels.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of active subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no subscriptions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
