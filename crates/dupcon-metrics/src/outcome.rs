//! Terminal classification of a duplicate group's consensus.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a duplicate group was turned into its consensus read.
///
/// A group starts as [`ConsensusOutcome::Unset`] and moves to exactly one terminal
/// outcome. Only [`ConsensusOutcome::IndelFail`] is not valid; it marks a verbatim
/// fallback copy rather than a synthesized consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConsensusOutcome {
    /// Not yet classified
    #[default]
    Unset,
    /// No member had an indel; columns were voted on a shared alignment
    AlignmentOnly,
    /// Members had indels and all agreed on their placement
    IndelMatch,
    /// Members had indels with differing placements that were reconciled by vote
    IndelMismatch,
    /// Indel placements could not be reconciled; the best member was copied
    IndelFail,
    /// Single member or unmapped first member; copied through without voting
    Supplementary,
}

impl ConsensusOutcome {
    /// Every terminal outcome, in reporting order.
    pub const TERMINAL: [ConsensusOutcome; 5] = [
        Self::AlignmentOnly,
        Self::IndelMatch,
        Self::IndelMismatch,
        Self::IndelFail,
        Self::Supplementary,
    ];

    /// Whether the outcome yields a usable consensus downstream.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Unset
            | Self::AlignmentOnly
            | Self::IndelMatch
            | Self::IndelMismatch
            | Self::Supplementary => true,
            Self::IndelFail => false,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Short snake-case key used in metrics output.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::AlignmentOnly => "alignment_only",
            Self::IndelMatch => "indel_match",
            Self::IndelMismatch => "indel_mismatch",
            Self::IndelFail => "indel_fail",
            Self::Supplementary => "supplementary",
        }
    }

    /// Returns a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unset => "Outcome not yet determined",
            Self::AlignmentOnly => "Consensus voted over a shared indel-free alignment",
            Self::IndelMatch => "Consensus built from members with identical indel placement",
            Self::IndelMismatch => "Consensus built from members with reconciled indel placement",
            Self::IndelFail => "Indel placement irreconcilable; best member copied verbatim",
            Self::Supplementary => "Single or unmapped-first member copied through",
        }
    }
}

impl fmt::Display for ConsensusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
