use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::object::ObjectId;

/// Length of identifiers produced by [`RandomIds`].
pub const RANDOM_ID_LENGTH: usize = 10;

/// Source of fresh object identifiers.
///
/// A provider is asked for a new identifier only when an object without one
/// is observed; once assigned, the identifier lives on the object itself, so
/// repeated lookups of the same object always yield the same id. Providers
/// must never return [`ROOT_ID`](crate::ROOT_ID).
pub trait IdentityProvider {
    fn next_id(&mut self) -> ObjectId;

    /// Called for every id restored from a log, so a provider with state
    /// can step past ids that are already taken.
    fn observe(&mut self, _id: &ObjectId) {}
}

/// Random alphanumeric identifiers.
pub struct RandomIds {
    rng: StdRng,
}

impl RandomIds {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for RandomIds {
    fn next_id(&mut self) -> ObjectId {
        // Ten characters can never collide with "root".
        let id: String = (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(RANDOM_ID_LENGTH)
            .map(char::from)
            .collect();
        ObjectId::from_generated(id)
    }
}

/// Counter-based identifiers: `obj-1`, `obj-2`, ...
///
/// The counter lives in memory only. Ids restored from a log advance it
/// through [`IdentityProvider::observe`], so a reloaded context continues
/// after the highest id it has seen with the same prefix.
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::with_prefix("obj")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for SequentialIds {
    fn next_id(&mut self) -> ObjectId {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        ObjectId::from_generated(id)
    }

    fn observe(&mut self, id: &ObjectId) {
        let seen = id
            .as_str()
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(n) = seen {
            self.next = self.next.max(n.saturating_add(1));
        }
    }
}

/// Time-ordered UUID v7 identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdentityProvider for UuidIds {
    fn next_id(&mut self) -> ObjectId {
        ObjectId::from_generated(uuid::Uuid::now_v7().to_string())
    }
}
