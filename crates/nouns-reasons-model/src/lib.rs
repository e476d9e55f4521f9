// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Domain records as indexed by the subgraph.
//!
//! Everything here is a read-only snapshot: proposals and votes are created
//! from a fetch response and never mutated afterwards.

mod ids;
mod order;
mod proposal;
mod vote;

pub use ids::{keccak256, namehash, Address, EnsName, ProposalId, VoterId, ADDRESS_HEX_LEN};
pub use order::SortOrder;
pub use proposal::{votable_proposals, Proposal, ProposalStatus};
pub use vote::{ProposalRef, Support, Vote};

pub const CRATE_NAME: &str = "nouns-reasons-model";
