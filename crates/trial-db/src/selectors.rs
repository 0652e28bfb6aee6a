//! Read-only query assembly for list and detail pages.
//!
//! Each selector joins what its page needs in one statement so rendering a
//! list never goes back to the database per row.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};

use trial_types::api::{
    Actor, AdvertiserCampaignRow, ApplyEligibility, CampaignCard, CampaignProposalCounts,
    CannotApplyReason, InfluencerProposalRow, ProposalDetail,
};
use trial_types::models::{Campaign, CampaignId, UserId};
use trial_types::status::{ProposalStatus, Role};

use crate::Database;
use crate::queries::{
    CAMPAIGN_COLUMN_COUNT, CAMPAIGN_COLUMNS, OptionalExt, PROPOSAL_COLUMN_COUNT, PROPOSAL_COLUMNS,
    campaign_from_row, proposal_from_row, proposal_exists, text_enum,
};

const NEWEST_FIRST: &str = "ORDER BY c.created_at DESC, c.id DESC";

impl Database {
    /// Banner on the home page: the most recently posted open campaign.
    pub fn latest_recruiting_campaign(&self) -> Result<Option<CampaignCard>> {
        self.with_conn(|conn| {
            let card = conn
                .query_row(
                    &format!("{} WHERE c.status = 'recruiting' {NEWEST_FIRST} LIMIT 1", card_select()),
                    [],
                    card_from_row,
                )
                .optional()?;
            Ok(card)
        })
    }

    pub fn recruiting_campaigns(&self) -> Result<Vec<CampaignCard>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE c.status = 'recruiting' {NEWEST_FIRST}",
                card_select()
            ))?;
            let rows = stmt
                .query_map([], card_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn campaign_detail(&self, campaign_id: CampaignId) -> Result<Option<CampaignCard>> {
        self.with_conn(|conn| {
            let card = conn
                .query_row(
                    &format!("{} WHERE c.id = ?1", card_select()),
                    [campaign_id],
                    card_from_row,
                )
                .optional()?;
            Ok(card)
        })
    }

    /// Everything an advertiser has posted, with how many applied to each.
    pub fn campaigns_by_advertiser(&self, advertiser_id: UserId) -> Result<Vec<AdvertiserCampaignRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAMPAIGN_COLUMNS},
                        (SELECT COUNT(*) FROM proposals p WHERE p.campaign_id = c.id)
                 FROM campaigns c
                 WHERE c.advertiser_id = ?1
                 {NEWEST_FIRST}"
            ))?;
            let rows = stmt
                .query_map([advertiser_id], |row| {
                    Ok(AdvertiserCampaignRow {
                        campaign: campaign_from_row(row, 0)?,
                        proposal_count: row.get(CAMPAIGN_COLUMN_COUNT)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Owner-scoped campaign with proposal counts per status. `None` when the
    /// campaign does not exist or belongs to someone else.
    pub fn campaign_with_proposal_counts(
        &self,
        campaign_id: CampaignId,
        advertiser_id: UserId,
    ) -> Result<Option<CampaignProposalCounts>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {CAMPAIGN_COLUMNS},
                                COUNT(p.id),
                                COALESCE(SUM(CASE WHEN p.status = 'submitted' THEN 1 ELSE 0 END), 0),
                                COALESCE(SUM(CASE WHEN p.status = 'selected' THEN 1 ELSE 0 END), 0),
                                COALESCE(SUM(CASE WHEN p.status = 'rejected' THEN 1 ELSE 0 END), 0)
                         FROM campaigns c
                         LEFT JOIN proposals p ON p.campaign_id = c.id
                         WHERE c.id = ?1 AND c.advertiser_id = ?2
                         GROUP BY c.id"
                    ),
                    params![campaign_id, advertiser_id],
                    |row| {
                        let n = CAMPAIGN_COLUMN_COUNT;
                        Ok(CampaignProposalCounts {
                            campaign: campaign_from_row(row, 0)?,
                            total_proposals: row.get(n)?,
                            submitted_proposals: row.get(n + 1)?,
                            selected_proposals: row.get(n + 2)?,
                            rejected_proposals: row.get(n + 3)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Applicants of a campaign with their contact details, newest first.
    pub fn proposals_by_campaign(&self, campaign_id: CampaignId) -> Result<Vec<ProposalDetail>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, u.name, u.email, u.contact, ip.sns_link,
                        p.cover_letter, p.desired_visit_date, p.status, p.created_at
                 FROM proposals p
                 JOIN users u ON u.id = p.influencer_id
                 LEFT JOIN influencer_profiles ip ON ip.user_id = p.influencer_id
                 WHERE p.campaign_id = ?1
                 ORDER BY p.created_at DESC, p.id DESC",
            )?;
            let rows = stmt
                .query_map([campaign_id], |row| {
                    Ok(ProposalDetail {
                        proposal_id: row.get(0)?,
                        influencer_name: row.get(1)?,
                        influencer_email: row.get(2)?,
                        influencer_contact: row.get(3)?,
                        sns_link: row.get(4)?,
                        cover_letter: row.get(5)?,
                        desired_visit_date: row.get(6)?,
                        status: text_enum(row, 7)?,
                        created_at: row.get(8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// An influencer's applications: submitted, then selected, then
    /// rejected; newest first within each group.
    pub fn influencer_proposals(&self, influencer_id: UserId) -> Result<Vec<InfluencerProposalRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROPOSAL_COLUMNS},
                        c.name, c.status, c.recruitment_end_date, u.name, ap.company_name
                 FROM proposals p
                 JOIN campaigns c ON c.id = p.campaign_id
                 JOIN users u ON u.id = c.advertiser_id
                 LEFT JOIN advertiser_profiles ap ON ap.user_id = c.advertiser_id
                 WHERE p.influencer_id = ?1
                 ORDER BY CASE p.status
                              WHEN 'submitted' THEN 1
                              WHEN 'selected' THEN 2
                              WHEN 'rejected' THEN 3
                              ELSE 4
                          END,
                          p.created_at DESC, p.id DESC"
            ))?;
            let rows = stmt
                .query_map([influencer_id], |row| {
                    let n = PROPOSAL_COLUMN_COUNT;
                    Ok(InfluencerProposalRow {
                        proposal: proposal_from_row(row, 0)?,
                        campaign_name: row.get(n)?,
                        campaign_status: text_enum(row, n + 1)?,
                        recruitment_end_date: row.get(n + 2)?,
                        advertiser_name: row.get(n + 3)?,
                        company_name: row.get(n + 4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn proposal_counts_by_status(
        &self,
        influencer_id: UserId,
    ) -> Result<HashMap<ProposalStatus, i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM proposals WHERE influencer_id = ?1 GROUP BY status",
            )?;
            let counts = stmt
                .query_map([influencer_id], |row| {
                    Ok((text_enum::<ProposalStatus>(row, 0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<std::result::Result<HashMap<_, _>, _>>()?;
            Ok(counts)
        })
    }

    /// Whether `viewer` could apply to `campaign` on `today`, and if not, why.
    pub fn check_can_apply(
        &self,
        campaign: &Campaign,
        viewer: Option<Actor>,
        today: NaiveDate,
    ) -> Result<ApplyEligibility> {
        self.with_conn(|conn| eligibility(conn, campaign, viewer, today))
    }
}

fn eligibility(
    conn: &Connection,
    campaign: &Campaign,
    viewer: Option<Actor>,
    today: NaiveDate,
) -> Result<ApplyEligibility> {
    let Some(viewer) = viewer else {
        return Ok(ApplyEligibility::denied(CannotApplyReason::LoginRequired));
    };

    let reason = if viewer.role == Role::Advertiser {
        Some(CannotApplyReason::AdvertiserNotAllowed)
    } else if !campaign.is_recruiting() {
        Some(CannotApplyReason::RecruitmentEnded)
    } else if today < campaign.recruitment_start_date {
        Some(CannotApplyReason::NotStarted)
    } else if today > campaign.recruitment_end_date {
        Some(CannotApplyReason::DeadlinePassed)
    } else if proposal_exists(conn, campaign.id, viewer.id)? {
        Some(CannotApplyReason::AlreadyApplied)
    } else {
        None
    };

    Ok(reason.map_or_else(ApplyEligibility::allowed, ApplyEligibility::denied))
}

fn card_select() -> String {
    format!(
        "SELECT {CAMPAIGN_COLUMNS}, u.name, ap.company_name
         FROM campaigns c
         JOIN users u ON u.id = c.advertiser_id
         LEFT JOIN advertiser_profiles ap ON ap.user_id = c.advertiser_id"
    )
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<CampaignCard> {
    Ok(CampaignCard {
        campaign: campaign_from_row(row, 0)?,
        advertiser_name: row.get(CAMPAIGN_COLUMN_COUNT)?,
        company_name: row.get(CAMPAIGN_COLUMN_COUNT + 1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{advertiser, campaign_between, influencer, open_campaign};
    use crate::queries::{insert_proposal, set_remaining_proposal_status, update_campaign_status};
    use trial_types::status::CampaignStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 10).unwrap()
    }

    #[test]
    fn test_recruiting_lists_only_open_campaigns_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let adv = advertiser(&db, "a@example.com");
        let first = open_campaign(&db, adv, today());
        let second = open_campaign(&db, adv, today());
        let closed = open_campaign(&db, adv, today());
        db.with_conn(|conn| update_campaign_status(conn, closed.id, CampaignStatus::RecruitmentEnded))
            .unwrap();

        let cards = db.recruiting_campaigns().unwrap();
        let ids: Vec<_> = cards.iter().map(|c| c.campaign.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(cards[0].company_name.as_deref(), Some("Acme Foods"));

        let banner = db.latest_recruiting_campaign().unwrap().unwrap();
        assert_eq!(banner.campaign.id, second.id);
    }

    #[test]
    fn test_latest_recruiting_is_none_when_nothing_open() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.latest_recruiting_campaign().unwrap().is_none());
        assert!(db.campaign_detail(42).unwrap().is_none());
    }

    #[test]
    fn test_counts_are_owner_scoped() {
        let db = Database::open_in_memory().unwrap();
        let adv = advertiser(&db, "a@example.com");
        let other = advertiser(&db, "b@example.com");
        let c = open_campaign(&db, adv, today());
        let inf1 = influencer(&db, "i1@example.com");
        let inf2 = influencer(&db, "i2@example.com");
        db.with_conn(|conn| {
            insert_proposal(conn, c.id, inf1, "pick me", today())?;
            insert_proposal(conn, c.id, inf2, "me too", today())?;
            Ok(())
        })
        .unwrap();

        assert!(db.campaign_with_proposal_counts(c.id, other).unwrap().is_none());

        let counts = db.campaign_with_proposal_counts(c.id, adv).unwrap().unwrap();
        assert_eq!(counts.total_proposals, 2);
        assert_eq!(counts.submitted_proposals, 2);
        assert_eq!(counts.selected_proposals, 0);

        let empty = open_campaign(&db, adv, today());
        let counts = db.campaign_with_proposal_counts(empty.id, adv).unwrap().unwrap();
        assert_eq!(counts.total_proposals, 0);
        assert_eq!(counts.rejected_proposals, 0);

        let listed = db.campaigns_by_advertiser(adv).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].proposal_count, 2);
    }

    #[test]
    fn test_influencer_proposals_order_by_status_then_newest() {
        let db = Database::open_in_memory().unwrap();
        let adv = advertiser(&db, "a@example.com");
        let inf = influencer(&db, "i@example.com");
        let c1 = open_campaign(&db, adv, today());
        let c2 = open_campaign(&db, adv, today());
        let c3 = open_campaign(&db, adv, today());
        let (p1, p2, p3) = db
            .with_conn(|conn| {
                Ok((
                    insert_proposal(conn, c1.id, inf, "one", today())?,
                    insert_proposal(conn, c2.id, inf, "two", today())?,
                    insert_proposal(conn, c3.id, inf, "three", today())?,
                ))
            })
            .unwrap();
        db.with_conn(|conn| {
            set_remaining_proposal_status(conn, c1.id, ProposalStatus::Submitted, ProposalStatus::Rejected)?;
            set_remaining_proposal_status(conn, c2.id, ProposalStatus::Submitted, ProposalStatus::Selected)?;
            Ok(())
        })
        .unwrap();

        let rows = db.influencer_proposals(inf).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.proposal.id).collect();
        assert_eq!(ids, vec![p3.id, p2.id, p1.id]);
        assert_eq!(rows[0].advertiser_name, "Advertiser a@example.com");

        let counts = db.proposal_counts_by_status(inf).unwrap();
        assert_eq!(counts.get(&ProposalStatus::Submitted), Some(&1));
        assert_eq!(counts.get(&ProposalStatus::Selected), Some(&1));
        assert_eq!(counts.get(&ProposalStatus::Rejected), Some(&1));
    }

    #[test]
    fn test_proposals_by_campaign_carry_influencer_contact() {
        let db = Database::open_in_memory().unwrap();
        let adv = advertiser(&db, "a@example.com");
        let inf = influencer(&db, "i@example.com");
        let c = open_campaign(&db, adv, today());
        db.with_conn(|conn| insert_proposal(conn, c.id, inf, "hello", today()))
            .unwrap();

        let rows = db.proposals_by_campaign(c.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].influencer_email, "i@example.com");
        assert_eq!(rows[0].sns_link.as_deref(), Some("https://blog.example.com/i@example.com"));
        assert_eq!(rows[0].status, ProposalStatus::Submitted);
    }

    #[test]
    fn test_eligibility_reasons_in_order() {
        let db = Database::open_in_memory().unwrap();
        let adv = advertiser(&db, "a@example.com");
        let inf = influencer(&db, "i@example.com");
        let c = open_campaign(&db, adv, today());
        let as_inf = Some(Actor { id: inf, role: Role::Influencer });
        let as_adv = Some(Actor { id: adv, role: Role::Advertiser });

        let check = |viewer, day| db.check_can_apply(&c, viewer, day).unwrap();

        assert_eq!(check(None, today()).reason, Some(CannotApplyReason::LoginRequired));
        assert_eq!(check(as_adv, today()).reason, Some(CannotApplyReason::AdvertiserNotAllowed));
        assert_eq!(check(as_inf, today()), ApplyEligibility::allowed());

        let late = c.recruitment_end_date.succ_opt().unwrap();
        assert_eq!(check(as_inf, late).reason, Some(CannotApplyReason::DeadlinePassed));
        let early = c.recruitment_start_date.pred_opt().unwrap();
        assert_eq!(check(as_inf, early).reason, Some(CannotApplyReason::NotStarted));

        db.with_conn(|conn| insert_proposal(conn, c.id, inf, "hi", today()))
            .unwrap();
        let applied = check(as_inf, today());
        assert!(!applied.can_apply);
        assert!(applied.already_applied);
    }

    #[test]
    fn test_eligibility_closed_campaign() {
        let db = Database::open_in_memory().unwrap();
        let adv = advertiser(&db, "a@example.com");
        let inf = influencer(&db, "i@example.com");
        let c = campaign_between(&db, adv, today(), today());
        db.with_conn(|conn| update_campaign_status(conn, c.id, CampaignStatus::RecruitmentEnded))
            .unwrap();
        let c = db.get_campaign(c.id).unwrap().unwrap();

        let result = db
            .check_can_apply(&c, Some(Actor { id: inf, role: Role::Influencer }), today())
            .unwrap();
        assert_eq!(result.reason, Some(CannotApplyReason::RecruitmentEnded));
    }
}
