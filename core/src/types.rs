//! Domain types: events, holds and user names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// Unique identifier of an event.
///
/// Assigned sequentially by the registry, starting at 1, and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Wrap a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name identifying a user.
///
/// There is no identity beyond this name: two requests carrying the same name
/// are the same user. Surrounding whitespace is dropped on construction, so
/// `" ana"` and `"ana"` are one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Create a user name, trimming surrounding whitespace
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.len() == name.len() {
            Self(name)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Borrow the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name was empty or whitespace only
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for UserName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl From<&str> for UserName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for UserName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A temporary, time-limited claim on one spot of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Holder of the spot
    pub user_name: UserName,
    /// When the hold was granted
    pub created_at: DateTime<Utc>,
}

impl Hold {
    /// Create a hold granted at `created_at`
    #[must_use]
    pub const fn new(user_name: UserName, created_at: DateTime<Utc>) -> Self {
        Self {
            user_name,
            created_at,
        }
    }

    /// Time elapsed since the hold was granted.
    ///
    /// A clock that moved backwards yields zero.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Time left before the hold expires under `timeout` (zero once expired)
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>, timeout: Duration) -> Duration {
        timeout.saturating_sub(self.elapsed(now))
    }

    /// Whether the hold has lived for at least `timeout`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.elapsed(now) >= timeout
    }
}

/// An event with a fixed number of spots.
///
/// `available_spots + reserved_users.len() + confirmed_by.len() == capacity`
/// holds after every reducer step, except under the legacy
/// [`CancelPolicy::AlwaysRelease`](crate::CancelPolicy::AlwaysRelease).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique id
    pub id: EventId,
    /// Unique display name
    pub name: String,
    /// Spots the event was created with
    pub capacity: u32,
    /// Spots neither held nor confirmed
    pub available_spots: u32,
    /// Users whose hold became a permanent confirmation, in confirmation order
    pub confirmed_by: Vec<UserName>,
    /// Active temporary holds, in grant order
    pub reserved_users: Vec<Hold>,
}

impl Event {
    /// Create an empty event with every spot available
    #[must_use]
    pub fn new(id: EventId, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            available_spots: capacity,
            confirmed_by: Vec::new(),
            reserved_users: Vec::new(),
        }
    }

    /// Whether at least one spot is free
    #[must_use]
    pub const fn has_available_spot(&self) -> bool {
        self.available_spots > 0
    }

    /// The active hold of `user_name`, if any
    #[must_use]
    pub fn hold_of(&self, user_name: &UserName) -> Option<&Hold> {
        self.reserved_users
            .iter()
            .find(|hold| &hold.user_name == user_name)
    }

    /// Whether `user_name` holds or has confirmed a spot here
    #[must_use]
    pub fn involves(&self, user_name: &UserName) -> bool {
        self.hold_of(user_name).is_some() || self.confirmed_by.contains(user_name)
    }

    /// Spots consumed by holds and confirmations
    #[must_use]
    pub fn consumed_spots(&self) -> usize {
        self.reserved_users.len() + self.confirmed_by.len()
    }

    /// Take one spot for `hold`.
    ///
    /// Returns `false` and leaves the event untouched when no spot is free.
    pub fn grant_hold(&mut self, hold: Hold) -> bool {
        if self.available_spots == 0 {
            return false;
        }
        self.available_spots -= 1;
        self.reserved_users.push(hold);
        true
    }

    /// Remove the hold of `user_name` and return its spot.
    ///
    /// Returns `false` when the user had no hold here.
    pub fn release_hold(&mut self, user_name: &UserName) -> bool {
        let before = self.reserved_users.len();
        self.reserved_users.retain(|hold| &hold.user_name != user_name);
        if self.reserved_users.len() == before {
            return false;
        }
        self.available_spots = self.available_spots.saturating_add(1);
        true
    }

    /// Turn the hold of `user_name` into a confirmation.
    ///
    /// The spot stays consumed. Returns `false` when the user had no hold here.
    pub fn confirm_hold(&mut self, user_name: &UserName) -> bool {
        let Some(index) = self
            .reserved_users
            .iter()
            .position(|hold| &hold.user_name == user_name)
        else {
            return false;
        };
        let hold = self.reserved_users.remove(index);
        self.confirmed_by.push(hold.user_name);
        true
    }
}
