use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Stable id for a username, used by dev identities and seeded directories.
    pub fn from_username(username: &str) -> Self {
        UserId(uuid::Uuid::new_v5(
            &uuid::Uuid::NAMESPACE_OID,
            username.as_bytes(),
        ))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// Unordered pair of users, normalized so that `min() <= max()`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct UserPair(UserId, UserId);

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn min(&self) -> UserId {
        self.0
    }

    pub fn max(&self) -> UserId {
        self.1
    }

    /// The member of the pair that is not `me`.
    pub fn other(&self, me: UserId) -> UserId {
        if self.0 == me { self.1 } else { self.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_unordered() {
        let alice = UserId::from_username("alice");
        let bob = UserId::from_username("bob");

        assert_eq!(UserPair::new(alice, bob), UserPair::new(bob, alice));
        assert!(UserPair::new(bob, alice).min() <= UserPair::new(bob, alice).max());
        assert_eq!(UserPair::new(alice, bob).other(alice), bob);
        assert_eq!(UserPair::new(alice, bob).other(bob), alice);
    }

    #[test]
    fn username_ids_are_stable() {
        assert_eq!(UserId::from_username("alice"), UserId::from_username("alice"));
        assert_ne!(UserId::from_username("alice"), UserId::from_username("bob"));
    }
}
