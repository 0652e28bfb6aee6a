use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{Campaign, CampaignId, Proposal, ProposalId, UserId};
use crate::status::{CampaignStatus, ProposalStatus, Role};

// -- Session --

/// Claims carried in the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.sub,
            role: self.role,
        }
    }
}

/// The authenticated user a service call is made on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

// -- Forms (raw urlencoded payloads, validated in trial-api) --

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub password_confirm: String,
    pub name: String,
    pub contact: String,
    pub role: String,
    pub terms_agreed: Option<String>,
    pub company_name: String,
    pub business_registration_number: String,
    pub birth_date: String,
    pub sns_link: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignCreateForm {
    pub name: String,
    pub recruitment_start_date: String,
    pub recruitment_end_date: String,
    pub recruitment_count: String,
    pub benefits: String,
    pub mission: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalCreateForm {
    pub cover_letter: String,
    pub desired_visit_date: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SelectInfluencersForm {
    #[serde(rename = "selected_proposals[]")]
    pub selected_proposals: Vec<String>,
}

// -- Service inputs --

#[derive(Debug, Clone)]
pub struct SignupDto {
    pub email: String,
    pub password: String,
    pub name: String,
    pub contact: String,
    pub profile: SignupProfile,
}

/// Role-specific signup data. The variant decides the account's role.
#[derive(Debug, Clone)]
pub enum SignupProfile {
    Advertiser {
        company_name: String,
        business_registration_number: String,
    },
    Influencer {
        birth_date: NaiveDate,
        sns_link: String,
    },
}

impl SignupProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Advertiser { .. } => Role::Advertiser,
            Self::Influencer { .. } => Role::Influencer,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CampaignCreateDto {
    pub name: String,
    pub recruitment_start_date: NaiveDate,
    pub recruitment_end_date: NaiveDate,
    pub recruitment_count: i64,
    pub benefits: String,
    pub mission: String,
}

#[derive(Debug, Clone)]
pub struct InfluencerSelectionDto {
    pub campaign_id: CampaignId,
    pub selected_proposal_ids: Vec<ProposalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    pub campaign_id: CampaignId,
    pub selected_count: usize,
    pub rejected_count: usize,
    pub campaign_status: CampaignStatus,
}

#[derive(Debug, Clone)]
pub struct ProposalCreateDto {
    pub campaign_id: CampaignId,
    pub cover_letter: String,
    pub desired_visit_date: NaiveDate,
}

// -- Read views --

/// Campaign as listed on the public pages.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignCard {
    pub campaign: Campaign,
    pub advertiser_name: String,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvertiserCampaignRow {
    pub campaign: Campaign,
    pub proposal_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignProposalCounts {
    pub campaign: Campaign,
    pub total_proposals: i64,
    pub submitted_proposals: i64,
    pub selected_proposals: i64,
    pub rejected_proposals: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalDetail {
    pub proposal_id: ProposalId,
    pub influencer_name: String,
    pub influencer_email: String,
    pub influencer_contact: String,
    pub sns_link: Option<String>,
    pub cover_letter: String,
    pub desired_visit_date: NaiveDate,
    pub status: ProposalStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfluencerProposalRow {
    pub proposal: Proposal,
    pub campaign_name: String,
    pub campaign_status: CampaignStatus,
    pub recruitment_end_date: NaiveDate,
    pub advertiser_name: String,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CannotApplyReason {
    LoginRequired,
    AdvertiserNotAllowed,
    RecruitmentEnded,
    NotStarted,
    DeadlinePassed,
    AlreadyApplied,
}

impl CannotApplyReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::LoginRequired => "Log in as an influencer to apply.",
            Self::AdvertiserNotAllowed => "Advertiser accounts cannot apply to campaigns.",
            Self::RecruitmentEnded => "Recruitment for this campaign has ended.",
            Self::NotStarted => "Recruitment has not started yet.",
            Self::DeadlinePassed => "The application deadline has passed.",
            Self::AlreadyApplied => "You have already applied to this campaign.",
        }
    }
}

/// Display flags for the "apply" button on a campaign page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplyEligibility {
    pub can_apply: bool,
    pub reason: Option<CannotApplyReason>,
    pub already_applied: bool,
}

impl ApplyEligibility {
    pub fn allowed() -> Self {
        Self {
            can_apply: true,
            reason: None,
            already_applied: false,
        }
    }

    pub fn denied(reason: CannotApplyReason) -> Self {
        Self {
            can_apply: false,
            reason: Some(reason),
            already_applied: reason == CannotApplyReason::AlreadyApplied,
        }
    }
}
