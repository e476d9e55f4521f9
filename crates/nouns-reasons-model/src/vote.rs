// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{Address, ProposalId};

/// A vote's stance on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Support {
    For,
    Against,
    Abstain,
}

impl Support {
    /// Maps the indexer's nullable boolean: `true` for, `false` against,
    /// missing abstain.
    #[must_use]
    pub const fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Self::For,
            Some(false) => Self::Against,
            None => Self::Abstain,
        }
    }

    /// Governor `support` values: 0 against, 1 for, 2 abstain.
    #[must_use]
    pub const fn from_detailed(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Against),
            1 => Some(Self::For),
            2 => Some(Self::Abstain),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::For => "FOR",
            Self::Against => "AGAINST",
            Self::Abstain => "ABSTAIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProposalRef {
    pub id: ProposalId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Vote {
    pub id: String,
    pub voter: Address,
    pub support: Support,
    pub votes: u64,
    #[serde(default)]
    pub reason: Option<String>,
    pub block_number: u64,
    pub proposal: ProposalRef,
}

impl Vote {
    /// The rationale, if it carries any non-whitespace text.
    #[must_use]
    pub fn reason_text(&self) -> Option<&str> {
        self.reason.as_deref().filter(|r| !r.trim().is_empty())
    }
}
