//! One event channel per key of an enumeration.
//!
//! [`KeyedEventRegistry`] persists two parallel lists, keys and channels, and
//! keeps a key → index map alongside for lookup. The map is derived state: it is
//! rebuilt whenever the registry is loaded.

use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use callwire_core::RegistryError;

/// Which entry wins when the persisted keys contain a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// The earliest entry is reachable; later duplicates are ignored.
    #[default]
    KeepFirst,
    /// The latest entry is reachable.
    KeepLast,
}

/// Channels keyed by a small copyable key, usually a host enum.
pub struct KeyedEventRegistry<K, C> {
    keys: Vec<K>,
    channels: Vec<C>,
    index: FxHashMap<K, usize>,
    policy: DuplicateKeyPolicy,
}

impl<K, C> KeyedEventRegistry<K, C>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self::with_policy(DuplicateKeyPolicy::default())
    }

    pub fn with_policy(policy: DuplicateKeyPolicy) -> Self {
        Self {
            keys: Vec::new(),
            channels: Vec::new(),
            index: FxHashMap::default(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicateKeyPolicy {
        self.policy
    }

    /// Change the duplicate policy and rebuild the lookup map with it.
    pub fn set_policy(&mut self, policy: DuplicateKeyPolicy) {
        self.policy = policy;
        self.rebuild_mapping();
    }

    /// Add a default channel for `key`.
    pub fn add(&mut self, key: K) -> Result<&mut C, RegistryError>
    where
        C: Default,
    {
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateKey {
                key: format!("{:?}", key),
            });
        }
        let index = self.channels.len();
        self.keys.push(key);
        self.channels.push(C::default());
        self.index.insert(key, index);
        Ok(&mut self.channels[index])
    }

    /// The channel for `key`, added if missing.
    pub fn get_or_add(&mut self, key: K) -> &mut C
    where
        C: Default,
    {
        let index = match self.index.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.channels.len();
                self.keys.push(key);
                self.channels.push(C::default());
                self.index.insert(key, index);
                index
            }
        };
        &mut self.channels[index]
    }

    /// Remove `key` and its channel. Returns whether anything was removed.
    ///
    /// Unreachable duplicates of `key` in the persisted lists are removed too,
    /// so the key stays gone after a save and load.
    pub fn remove(&mut self, key: K) -> bool {
        if !self.index.contains_key(&key) {
            return false;
        }
        let mut i = 0;
        self.channels.retain(|_| {
            let keep = self.keys.get(i) != Some(&key);
            i += 1;
            keep
        });
        self.keys.retain(|k| *k != key);
        self.rebuild_mapping();
        true
    }

    pub fn get(&self, key: K) -> Option<&C> {
        self.index.get(&key).and_then(|&i| self.channels.get(i))
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut C> {
        self.index.get(&key).and_then(|&i| self.channels.get_mut(i))
    }

    pub fn contains(&self, key: K) -> bool {
        self.index.contains_key(&key)
    }

    /// Number of reachable keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Persisted keys, in order, including unreachable duplicates.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Persisted channels, parallel to [`keys`](Self::keys).
    pub fn channels(&self) -> &[C] {
        &self.channels
    }

    /// Reachable (key, channel) pairs in persisted order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &C)> + '_ {
        self.keys
            .iter()
            .zip(&self.channels)
            .enumerate()
            .filter(|(i, (key, _))| self.index.get(*key) == Some(i))
            .map(|(_, (key, channel))| (*key, channel))
    }

    /// Rebuild the key → index map from the persisted lists.
    ///
    /// Duplicate keys are logged and resolved by the [`DuplicateKeyPolicy`].
    /// If the lists differ in length, a warning is logged and the map stays empty.
    pub fn rebuild_mapping(&mut self) {
        self.index.clear();
        if self.keys.len() != self.channels.len() {
            warn!(
                keys = self.keys.len(),
                channels = self.channels.len(),
                "keyed registry lists differ in length; no keys are reachable"
            );
            return;
        }
        for (i, key) in self.keys.iter().enumerate() {
            match self.index.entry(*key) {
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
                Entry::Occupied(mut slot) => {
                    warn!(
                        key = ?key,
                        first = *slot.get(),
                        duplicate = i,
                        policy = ?self.policy,
                        "duplicate key in keyed registry"
                    );
                    if self.policy == DuplicateKeyPolicy::KeepLast {
                        slot.insert(i);
                    }
                }
            }
        }
        debug!(keys = self.index.len(), "rebuilt keyed registry mapping");
    }
}

impl<K, C> Default for KeyedEventRegistry<K, C>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, C: Clone> Clone for KeyedEventRegistry<K, C> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            channels: self.channels.clone(),
            index: self.index.clone(),
            policy: self.policy,
        }
    }
}

impl<K: fmt::Debug, C: fmt::Debug> fmt::Debug for KeyedEventRegistry<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedEventRegistry")
            .field("keys", &self.keys)
            .field("channels", &self.channels)
            .field("policy", &self.policy)
            .finish()
    }
}

#[derive(Serialize)]
struct PersistedRef<'a, K, C> {
    keys: &'a [K],
    channels: &'a [C],
}

#[derive(Deserialize)]
struct Persisted<K, C> {
    #[serde(default = "Vec::new")]
    keys: Vec<K>,
    #[serde(default = "Vec::new")]
    channels: Vec<C>,
}

impl<K: Serialize, C: Serialize> Serialize for KeyedEventRegistry<K, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PersistedRef {
            keys: &self.keys,
            channels: &self.channels,
        }
        .serialize(serializer)
    }
}

impl<'de, K, C> Deserialize<'de> for KeyedEventRegistry<K, C>
where
    K: Deserialize<'de> + Copy + Eq + Hash + fmt::Debug,
    C: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let persisted = Persisted::<K, C>::deserialize(deserializer)?;
        let mut registry = Self {
            keys: persisted.keys,
            channels: persisted.channels,
            index: FxHashMap::default(),
            policy: DuplicateKeyPolicy::default(),
        };
        registry.rebuild_mapping();
        Ok(registry)
    }
}
