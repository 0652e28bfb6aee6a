//! Lifecycle enums for campaigns and proposals.
//!
//! Every status change in the system goes through [`CampaignStatus::apply`]
//! or [`ProposalStatus::decide`]; services never assign a status directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Advertiser,
    Influencer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advertiser => "advertiser",
            Self::Influencer => "influencer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Recruiting,
    RecruitmentEnded,
    SelectionComplete,
}

/// Actions an advertiser can take that move a campaign forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignEvent {
    CloseRecruitment,
    CompleteSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("campaign is {from}, cannot {event:?}")]
    Campaign {
        from: CampaignStatus,
        event: CampaignEvent,
    },
    #[error("proposal is already {0}")]
    ProposalDecided(ProposalStatus),
}

impl CampaignStatus {
    /// The only place campaign status moves. Returns the next status or the
    /// rejected (status, event) pair.
    pub fn apply(self, event: CampaignEvent) -> Result<CampaignStatus, TransitionError> {
        match (self, event) {
            (Self::Recruiting, CampaignEvent::CloseRecruitment) => Ok(Self::RecruitmentEnded),
            (Self::RecruitmentEnded, CampaignEvent::CompleteSelection) => {
                Ok(Self::SelectionComplete)
            }
            (from, event) => Err(TransitionError::Campaign { from, event }),
        }
    }

    /// Position in the lifecycle. Strictly increases across `apply`.
    pub fn rank(self) -> u8 {
        match self {
            Self::Recruiting => 0,
            Self::RecruitmentEnded => 1,
            Self::SelectionComplete => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recruiting => "recruiting",
            Self::RecruitmentEnded => "recruitment_ended",
            Self::SelectionComplete => "selection_complete",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Recruiting => "Recruiting",
            Self::RecruitmentEnded => "Recruitment ended",
            Self::SelectionComplete => "Selection complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Submitted,
    Selected,
    Rejected,
}

impl ProposalStatus {
    /// Outcome of a selection round for one proposal.
    pub fn decide(self, selected: bool) -> Result<ProposalStatus, TransitionError> {
        match self {
            Self::Submitted if selected => Ok(Self::Selected),
            Self::Submitted => Ok(Self::Rejected),
            decided => Err(TransitionError::ProposalDecided(decided)),
        }
    }

    /// Sort key for the influencer's list: pending first, then wins, then losses.
    pub fn display_order(self) -> u8 {
        match self {
            Self::Submitted => 1,
            Self::Selected => 2,
            Self::Rejected => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Selected => "selected",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Selected => "Selected",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($ty:ty, $kind:literal, [$($variant:path),+]) => {
        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == $variant.as_str() {
                        return Ok($variant);
                    }
                )+
                Err(ParseEnumError { kind: $kind, value: s.to_string() })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(Role, "role", [Role::Advertiser, Role::Influencer]);
text_enum!(
    CampaignStatus,
    "campaign status",
    [
        CampaignStatus::Recruiting,
        CampaignStatus::RecruitmentEnded,
        CampaignStatus::SelectionComplete
    ]
);
text_enum!(
    ProposalStatus,
    "proposal status",
    [
        ProposalStatus::Submitted,
        ProposalStatus::Selected,
        ProposalStatus::Rejected
    ]
);
