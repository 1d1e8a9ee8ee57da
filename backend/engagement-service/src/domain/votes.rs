//! Usefulness-score arithmetic for review votes.
//!
//! A voter holds at most one vote per review; a helpful vote contributes +1,
//! an unhelpful one -1. The score is adjusted by the net delta of the
//! old-to-new transition, so a polarity flip moves it by two.

/// Delta applied to a review's usefulness score when a voter's vote goes
/// from `previous` (None = no vote yet) to `next`.
pub fn vote_delta(previous: Option<bool>, next: bool) -> i64 {
    let old = match previous {
        Some(true) => 1,
        Some(false) => -1,
        None => 0,
    };
    let new = if next { 1 } else { -1 };
    new - old
}

/// Inverse delta applied when a vote of the given polarity is deleted.
pub fn removal_delta(helpful: bool) -> i64 {
    if helpful {
        -1
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_votes() {
        assert_eq!(vote_delta(None, true), 1);
        assert_eq!(vote_delta(None, false), -1);
    }

    #[test]
    fn test_polarity_flips_move_by_two() {
        assert_eq!(vote_delta(Some(true), false), -2);
        assert_eq!(vote_delta(Some(false), true), 2);
    }

    #[test]
    fn test_repeated_votes_are_neutral() {
        assert_eq!(vote_delta(Some(true), true), 0);
        assert_eq!(vote_delta(Some(false), false), 0);
    }

    #[test]
    fn test_removal_inverts_contribution() {
        assert_eq!(removal_delta(true), -1);
        assert_eq!(removal_delta(false), 1);
    }

    #[test]
    fn test_removal_undoes_fresh_vote() {
        for helpful in [true, false] {
            assert_eq!(vote_delta(None, helpful) + removal_delta(helpful), 0);
        }
    }
}
