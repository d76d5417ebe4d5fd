//! Status state machines for bids and tenders.
//!
//! Each lifecycle is a constant mapping from current state to allowed targets.
//! A state not listed as a source is terminal. Same-state changes are never
//! listed, so an idempotent resubmission is rejected like any other illegal move.
use super::entity::{BidStatus, TenderStatus};
use super::error::ContractError;

pub trait Lifecycle: Copy + Eq + std::fmt::Display + 'static {
    fn allowed_targets(self) -> &'static [Self];

    fn can_transition(self, target: Self) -> bool {
        self.allowed_targets().contains(&target)
    }

    fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Returns the target when the move is legal.
    fn transition(self, target: Self) -> Result<Self, ContractError> {
        if !self.can_transition(target) {
            return Err(ContractError::InvalidTransition {
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        Ok(target)
    }
}

impl Lifecycle for BidStatus {
    fn allowed_targets(self) -> &'static [BidStatus] {
        match self {
            BidStatus::Submitted => &[BidStatus::Evaluated, BidStatus::Rejected],
            BidStatus::Evaluated => &[BidStatus::Awarded, BidStatus::Rejected],
            BidStatus::Awarded => &[],
            BidStatus::Rejected => &[],
        }
    }
}

impl Lifecycle for TenderStatus {
    fn allowed_targets(self) -> &'static [TenderStatus] {
        match self {
            TenderStatus::Open => &[TenderStatus::Closed],
            TenderStatus::Closed => &[TenderStatus::Awarded],
            TenderStatus::Awarded => &[],
        }
    }
}

pub fn can_transition<S: Lifecycle>(current: S, target: S) -> bool {
    current.can_transition(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const ALL_BID: [BidStatus; 4] = [
        BidStatus::Submitted,
        BidStatus::Evaluated,
        BidStatus::Awarded,
        BidStatus::Rejected,
    ];

    #[test]
    fn bid_table_matches_pipeline() {
        let allowed: Vec<(BidStatus, BidStatus)> = ALL_BID
            .iter()
            .flat_map(|from| ALL_BID.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| can_transition(*from, *to))
            .collect();

        assert_eq!(
            allowed,
            vec![
                (BidStatus::Submitted, BidStatus::Evaluated),
                (BidStatus::Submitted, BidStatus::Rejected),
                (BidStatus::Evaluated, BidStatus::Awarded),
                (BidStatus::Evaluated, BidStatus::Rejected),
            ]
        );
    }

    #[test]
    fn skipping_evaluation_is_illegal() {
        let err = BidStatus::Submitted
            .transition(BidStatus::Awarded)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(
            err.to_string(),
            "invalid status transition from Submitted to Awarded"
        );
    }

    #[test]
    fn same_state_is_illegal() {
        for status in ALL_BID {
            assert!(!can_transition(status, status));
        }
    }

    #[test]
    fn terminal_states() {
        assert!(BidStatus::Awarded.is_terminal());
        assert!(BidStatus::Rejected.is_terminal());
        assert!(!BidStatus::Evaluated.is_terminal());
        assert!(TenderStatus::Awarded.is_terminal());
    }

    #[test]
    fn tender_lifecycle() {
        assert!(can_transition(TenderStatus::Open, TenderStatus::Closed));
        assert!(can_transition(TenderStatus::Closed, TenderStatus::Awarded));
        assert!(!can_transition(TenderStatus::Open, TenderStatus::Awarded));
        assert!(!can_transition(TenderStatus::Closed, TenderStatus::Open));
    }
}
