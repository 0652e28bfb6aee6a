use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::status::{CampaignStatus, ProposalStatus, Role};

pub type UserId = i64;
pub type CampaignId = i64;
pub type ProposalId = i64;

/// Account record without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub contact: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvertiserProfile {
    pub user_id: UserId,
    pub company_name: String,
    pub business_registration_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluencerProfile {
    pub user_id: UserId,
    pub birth_date: NaiveDate,
    pub sns_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub advertiser_id: UserId,
    pub name: String,
    pub recruitment_start_date: NaiveDate,
    pub recruitment_end_date: NaiveDate,
    pub recruitment_count: i64,
    pub benefits: String,
    pub mission: String,
    pub status: CampaignStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Campaign {
    pub fn is_recruiting(&self) -> bool {
        self.status == CampaignStatus::Recruiting
    }

    /// Open for new proposals on `today`: recruiting and inside the window.
    pub fn accepts_applications(&self, today: NaiveDate) -> bool {
        self.is_recruiting()
            && self.recruitment_start_date <= today
            && today <= self.recruitment_end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub campaign_id: CampaignId,
    pub influencer_id: UserId,
    pub cover_letter: String,
    pub desired_visit_date: NaiveDate,
    pub status: ProposalStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(start: NaiveDate, end: NaiveDate, status: CampaignStatus) -> Campaign {
        let now = start.and_hms_opt(0, 0, 0).unwrap();
        Campaign {
            id: 1,
            advertiser_id: 1,
            name: "Spring tasting".into(),
            recruitment_start_date: start,
            recruitment_end_date: end,
            recruitment_count: 3,
            benefits: "Free dinner".into(),
            mission: "Post a review".into(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_accepts_applications_window_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let c = campaign(start, end, CampaignStatus::Recruiting);

        assert!(c.accepts_applications(start));
        assert!(c.accepts_applications(end));
        assert!(!c.accepts_applications(start.pred_opt().unwrap()));
        assert!(!c.accepts_applications(end.succ_opt().unwrap()));
    }

    #[test]
    fn test_closed_campaign_never_accepts() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let c = campaign(start, end, CampaignStatus::RecruitmentEnded);
        assert!(!c.accepts_applications(start));
    }
}
