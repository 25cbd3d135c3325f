//! Proposal review: accepting and rejecting reschedule proposals.
//!
//! Operates on caller-supplied snapshots of the committed placement set.
//! Acceptance uses an optimistic-concurrency check: the proposal's
//! original placement must still be current, otherwise the user (or a
//! later sync) already resolved the conflict and the proposal is stale.

use chrono::{DateTime, Utc};

use crate::error::ProposalError;
use crate::placement::Placement;

use super::{ProposalStatus, RescheduleProposal};

/// Check whether a proposal's target placement is no longer current.
///
/// Stale proposals must be treated as expired: ignored, never applied.
pub fn is_stale(proposal: &RescheduleProposal, committed: &[Placement]) -> bool {
    !committed
        .iter()
        .any(|placement| placement.same_commit(&proposal.original))
}

/// Accept a proposal, swapping the committed placement for the proposed one.
///
/// # Errors
/// - `AlreadyReviewed` if the proposal left the pending state
/// - `Stale` if the original placement is no longer current; the committed
///   set is left unmodified
pub fn accept(
    proposal: &mut RescheduleProposal,
    committed: &mut Vec<Placement>,
    now: DateTime<Utc>,
) -> Result<(), ProposalError> {
    if proposal.status != ProposalStatus::Pending {
        return Err(ProposalError::AlreadyReviewed {
            proposal_id: proposal.id.clone(),
            status: proposal.status,
        });
    }

    let Some(index) = committed
        .iter()
        .position(|placement| placement.same_commit(&proposal.original))
    else {
        return Err(ProposalError::Stale {
            proposal_id: proposal.id.clone(),
            task_id: proposal.task_id.clone(),
        });
    };

    committed[index] = proposal.proposed.clone();
    proposal.status = ProposalStatus::Accepted;
    proposal.reviewed_at = Some(now);
    Ok(())
}

/// Reject a proposal, leaving the original placement untouched.
///
/// Rejection means the user chose to keep the conflicting time; the
/// conflict itself remains unresolved.
///
/// # Errors
/// `AlreadyReviewed` if the proposal left the pending state (rejecting an
/// already-rejected proposal is an error, not a silent double-transition).
pub fn reject(
    proposal: &mut RescheduleProposal,
    now: DateTime<Utc>,
) -> Result<(), ProposalError> {
    if proposal.status != ProposalStatus::Pending {
        return Err(ProposalError::AlreadyReviewed {
            proposal_id: proposal.id.clone(),
            status: proposal.status,
        });
    }

    proposal.status = ProposalStatus::Rejected;
    proposal.reviewed_at = Some(now);
    Ok(())
}

/// A per-item failure inside a batch review
#[derive(Debug)]
pub struct BatchReviewError {
    pub proposal_id: String,
    pub error: ProposalError,
}

/// Result of a batch acceptance: partial success with per-item errors
#[derive(Debug, Default)]
pub struct BatchReviewOutcome {
    pub accepted: Vec<String>,
    pub errors: Vec<BatchReviewError>,
}

/// Accept a batch of proposals independently.
///
/// One proposal's staleness never aborts the others; earlier acceptances
/// in the batch are visible to later ones (accepting two proposals that
/// target the same placement makes the second stale).
pub fn accept_batch(
    proposals: &mut [RescheduleProposal],
    committed: &mut Vec<Placement>,
    now: DateTime<Utc>,
) -> BatchReviewOutcome {
    let mut outcome = BatchReviewOutcome::default();

    for proposal in proposals {
        match accept(proposal, committed, now) {
            Ok(()) => outcome.accepted.push(proposal.id.clone()),
            Err(error) => outcome.errors.push(BatchReviewError {
                proposal_id: proposal.id.clone(),
                error,
            }),
        }
    }

    outcome
}
