use serde::{Deserialize, Serialize};

use super::models::UserId;

/// Friendship state for an unordered pair of users.
///
/// One directed edge row exists per pair at most; its direction records who
/// initiated the most recent relationship action and `accepted` whether the
/// other side confirmed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipState {
    /// No edge between the pair
    None,
    /// `from` requested, `to` has not confirmed
    Pending { from: UserId, to: UserId },
    /// Edge confirmed by the recipient
    Mutual,
}

impl FriendshipState {
    pub fn is_mutual(&self) -> bool {
        matches!(self, FriendshipState::Mutual)
    }
}

/// What a friend request did.
///
/// The second request for a pair always confirms the existing edge, whichever
/// side it points from; a repeat request on a mutual pair changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestOutcome {
    /// A new pending edge was created
    Requested,
    /// An existing edge was accepted, the pair is now mutual
    Confirmed,
    /// The pair was already mutual; no-op
    AlreadyFriends,
}

impl FriendRequestOutcome {
    /// Whether the request changed persistent state (and was feed-worthy).
    pub fn changed_state(&self) -> bool {
        !matches!(self, FriendRequestOutcome::AlreadyFriends)
    }
}

/// Canonical key for an unordered user pair.
pub fn normalize_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pair_is_order_independent() {
        assert_eq!(normalize_pair(3, 8), (3, 8));
        assert_eq!(normalize_pair(8, 3), (3, 8));
        assert_eq!(normalize_pair(5, 5), (5, 5));
    }

    #[test]
    fn test_outcome_state_change() {
        assert!(FriendRequestOutcome::Requested.changed_state());
        assert!(FriendRequestOutcome::Confirmed.changed_state());
        assert!(!FriendRequestOutcome::AlreadyFriends.changed_state());
    }

    #[test]
    fn test_mutual_probe() {
        assert!(FriendshipState::Mutual.is_mutual());
        assert!(!FriendshipState::None.is_mutual());
        assert!(!FriendshipState::Pending { from: 1, to: 2 }.is_mutual());
    }
}
