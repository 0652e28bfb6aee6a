use chrono::{Duration, NaiveDate};

use trial_db::Database;
use trial_db::models::NewUser;
use trial_db::queries::{insert_advertiser_profile, insert_influencer_profile, insert_proposal, insert_user};
use trial_types::api::{Actor, CampaignCreateDto};
use trial_types::models::{Campaign, ProposalId};
use trial_types::status::Role;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 10).unwrap()
}

pub fn actor(db: &Database, email: &str, role: Role) -> Actor {
    let id = db
        .with_conn(|conn| {
            let id = insert_user(
                conn,
                &NewUser {
                    email,
                    password_hash: "unused",
                    name: email,
                    contact: email,
                    role,
                },
            )?;
            match role {
                Role::Advertiser => insert_advertiser_profile(conn, id, "Acme", email)?,
                Role::Influencer => insert_influencer_profile(
                    conn,
                    id,
                    NaiveDate::from_ymd_opt(1998, 8, 8).unwrap(),
                    "https://sns.example.com/me",
                )?,
            }
            Ok(id)
        })
        .unwrap();
    Actor { id, role }
}

pub fn campaign_dto(headcount: i64) -> CampaignCreateDto {
    CampaignCreateDto {
        name: "Cafe opening".into(),
        recruitment_start_date: today() - Duration::days(2),
        recruitment_end_date: today() + Duration::days(5),
        recruitment_count: headcount,
        benefits: "Drinks".into(),
        mission: "Instagram post".into(),
    }
}

pub fn campaign(db: &Database, owner: Actor, headcount: i64) -> Campaign {
    db.create_campaign(owner.id, &campaign_dto(headcount)).unwrap()
}

/// `n` fresh influencers each apply to `campaign`.
pub fn applicants(db: &Database, campaign: &Campaign, n: usize) -> Vec<ProposalId> {
    (0..n)
        .map(|i| {
            let inf = actor(db, &format!("c{}-inf{}@example.com", campaign.id, i), Role::Influencer);
            db.with_conn(|conn| insert_proposal(conn, campaign.id, inf.id, "pick me", today()))
                .unwrap()
                .id
        })
        .collect()
}
