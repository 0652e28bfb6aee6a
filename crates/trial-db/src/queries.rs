use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params, params_from_iter};

use trial_types::api::CampaignCreateDto;
use trial_types::models::{
    AdvertiserProfile, Campaign, CampaignId, InfluencerProfile, Proposal, ProposalId, UserId,
};
use trial_types::status::{CampaignStatus, ProposalStatus};

use crate::Database;
use crate::models::{NewUser, UserRow};

const NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

pub(crate) const CAMPAIGN_COLUMNS: &str = "c.id, c.advertiser_id, c.name, c.recruitment_start_date, \
     c.recruitment_end_date, c.recruitment_count, c.benefits, c.mission, c.status, \
     c.created_at, c.updated_at";
pub(crate) const CAMPAIGN_COLUMN_COUNT: usize = 11;

pub(crate) const PROPOSAL_COLUMNS: &str = "p.id, p.campaign_id, p.influencer_id, p.cover_letter, \
     p.desired_visit_date, p.status, p.created_at, p.updated_at";
pub(crate) const PROPOSAL_COLUMN_COUNT: usize = 8;

const USER_COLUMNS: &str = "id, email, password, name, contact, role, is_active, created_at";

impl Database {
    // -- Users --

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"), email)
        })
    }

    pub fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"), id)
        })
    }

    pub fn get_advertiser_profile(&self, user_id: UserId) -> Result<Option<AdvertiserProfile>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT user_id, company_name, business_registration_number
                     FROM advertiser_profiles WHERE user_id = ?1",
                    [user_id],
                    |row| {
                        Ok(AdvertiserProfile {
                            user_id: row.get(0)?,
                            company_name: row.get(1)?,
                            business_registration_number: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_influencer_profile(&self, user_id: UserId) -> Result<Option<InfluencerProfile>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT user_id, birth_date, sns_link FROM influencer_profiles WHERE user_id = ?1",
                    [user_id],
                    |row| {
                        Ok(InfluencerProfile {
                            user_id: row.get(0)?,
                            birth_date: row.get(1)?,
                            sns_link: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Campaigns --

    pub fn create_campaign(&self, advertiser_id: UserId, dto: &CampaignCreateDto) -> Result<Campaign> {
        self.with_conn(|conn| insert_campaign(conn, advertiser_id, dto))
    }

    pub fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>> {
        self.with_conn(|conn| find_campaign(conn, id))
    }

    // -- Proposals --

    pub fn get_proposal(&self, id: ProposalId) -> Result<Option<Proposal>> {
        self.with_conn(|conn| find_proposal(conn, id))
    }

    pub fn has_applied(&self, campaign_id: CampaignId, influencer_id: UserId) -> Result<bool> {
        self.with_conn(|conn| proposal_exists(conn, campaign_id, influencer_id))
    }
}

// -- Users (connection-level, usable inside a transaction) --

pub fn insert_user(conn: &Connection, user: &NewUser<'_>) -> Result<UserId> {
    conn.execute(
        "INSERT INTO users (email, password, name, contact, role) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.email,
            user.password_hash,
            user.name,
            user.contact,
            user.role.as_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_advertiser_profile(
    conn: &Connection,
    user_id: UserId,
    company_name: &str,
    business_registration_number: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO advertiser_profiles (user_id, company_name, business_registration_number)
         VALUES (?1, ?2, ?3)",
        params![user_id, company_name, business_registration_number],
    )?;
    Ok(())
}

pub fn insert_influencer_profile(
    conn: &Connection,
    user_id: UserId,
    birth_date: NaiveDate,
    sns_link: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO influencer_profiles (user_id, birth_date, sns_link) VALUES (?1, ?2, ?3)",
        params![user_id, birth_date, sns_link],
    )?;
    Ok(())
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
    exists(conn, "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)", email)
}

pub fn contact_exists(conn: &Connection, contact: &str) -> Result<bool> {
    exists(conn, "SELECT EXISTS(SELECT 1 FROM users WHERE contact = ?1)", contact)
}

pub fn registration_number_exists(conn: &Connection, number: &str) -> Result<bool> {
    exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM advertiser_profiles WHERE business_registration_number = ?1)",
        number,
    )
}

// -- Campaigns --

pub fn insert_campaign(
    conn: &Connection,
    advertiser_id: UserId,
    dto: &CampaignCreateDto,
) -> Result<Campaign> {
    conn.execute(
        "INSERT INTO campaigns (advertiser_id, name, recruitment_start_date, recruitment_end_date,
                                recruitment_count, benefits, mission, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            advertiser_id,
            dto.name,
            dto.recruitment_start_date,
            dto.recruitment_end_date,
            dto.recruitment_count,
            dto.benefits,
            dto.mission,
            CampaignStatus::Recruiting.as_str(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    find_campaign(conn, id)?.ok_or_else(|| anyhow::anyhow!("Campaign {} vanished after insert", id))
}

pub fn find_campaign(conn: &Connection, id: CampaignId) -> Result<Option<Campaign>> {
    let row = conn
        .query_row(
            &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns c WHERE c.id = ?1"),
            [id],
            |row| campaign_from_row(row, 0),
        )
        .optional()?;
    Ok(row)
}

pub fn update_campaign_status(
    conn: &Connection,
    id: CampaignId,
    status: CampaignStatus,
) -> Result<()> {
    conn.execute(
        &format!("UPDATE campaigns SET status = ?1, updated_at = {NOW} WHERE id = ?2"),
        params![status.as_str(), id],
    )?;
    Ok(())
}

// -- Proposals --

pub fn insert_proposal(
    conn: &Connection,
    campaign_id: CampaignId,
    influencer_id: UserId,
    cover_letter: &str,
    desired_visit_date: NaiveDate,
) -> Result<Proposal> {
    conn.execute(
        "INSERT INTO proposals (campaign_id, influencer_id, cover_letter, desired_visit_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            campaign_id,
            influencer_id,
            cover_letter,
            desired_visit_date,
            ProposalStatus::Submitted.as_str(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    find_proposal(conn, id)?.ok_or_else(|| anyhow::anyhow!("Proposal {} vanished after insert", id))
}

pub fn find_proposal(conn: &Connection, id: ProposalId) -> Result<Option<Proposal>> {
    let row = conn
        .query_row(
            &format!("SELECT {PROPOSAL_COLUMNS} FROM proposals p WHERE p.id = ?1"),
            [id],
            |row| proposal_from_row(row, 0),
        )
        .optional()?;
    Ok(row)
}

pub fn proposal_exists(
    conn: &Connection,
    campaign_id: CampaignId,
    influencer_id: UserId,
) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM proposals WHERE campaign_id = ?1 AND influencer_id = ?2)",
        params![campaign_id, influencer_id],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn count_proposals_with_status(
    conn: &Connection,
    campaign_id: CampaignId,
    status: ProposalStatus,
) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM proposals WHERE campaign_id = ?1 AND status = ?2",
        params![campaign_id, status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// How many of `ids` are proposals of `campaign_id` currently in `status`.
pub fn count_matching_proposals(
    conn: &Connection,
    campaign_id: CampaignId,
    ids: &[ProposalId],
    status: ProposalStatus,
) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "SELECT COUNT(*) FROM proposals
         WHERE campaign_id = ?1 AND status = ?2 AND id IN ({})",
        placeholders(3, ids.len())
    );
    let status_text = status.as_str();
    let mut values: Vec<&dyn rusqlite::ToSql> = vec![&campaign_id, &status_text];
    values.extend(ids.iter().map(|id| id as &dyn rusqlite::ToSql));

    let count: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
    Ok(count as usize)
}

/// Move the listed proposals of `campaign_id` from `from` to `to`.
/// Returns the number of rows changed.
pub fn set_proposal_status(
    conn: &Connection,
    campaign_id: CampaignId,
    ids: &[ProposalId],
    from: ProposalStatus,
    to: ProposalStatus,
) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE proposals SET status = ?1, updated_at = {NOW}
         WHERE campaign_id = ?2 AND status = ?3 AND id IN ({})",
        placeholders(4, ids.len())
    );
    let (to_text, from_text) = (to.as_str(), from.as_str());
    let mut values: Vec<&dyn rusqlite::ToSql> = vec![&to_text, &campaign_id, &from_text];
    values.extend(ids.iter().map(|id| id as &dyn rusqlite::ToSql));

    Ok(conn.execute(&sql, params_from_iter(values))?)
}

/// Move every proposal of `campaign_id` still in `from` to `to`.
pub fn set_remaining_proposal_status(
    conn: &Connection,
    campaign_id: CampaignId,
    from: ProposalStatus,
    to: ProposalStatus,
) -> Result<usize> {
    let changed = conn.execute(
        &format!(
            "UPDATE proposals SET status = ?1, updated_at = {NOW}
             WHERE campaign_id = ?2 AND status = ?3"
        ),
        params![to.as_str(), campaign_id, from.as_str()],
    )?;
    Ok(changed)
}

// -- Row mapping --

pub(crate) fn campaign_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: row.get(offset)?,
        advertiser_id: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
        recruitment_start_date: row.get(offset + 3)?,
        recruitment_end_date: row.get(offset + 4)?,
        recruitment_count: row.get(offset + 5)?,
        benefits: row.get(offset + 6)?,
        mission: row.get(offset + 7)?,
        status: text_enum(row, offset + 8)?,
        created_at: row.get(offset + 9)?,
        updated_at: row.get(offset + 10)?,
    })
}

pub(crate) fn proposal_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Proposal> {
    Ok(Proposal {
        id: row.get(offset)?,
        campaign_id: row.get(offset + 1)?,
        influencer_id: row.get(offset + 2)?,
        cover_letter: row.get(offset + 3)?,
        desired_visit_date: row.get(offset + 4)?,
        status: text_enum(row, offset + 5)?,
        created_at: row.get(offset + 6)?,
        updated_at: row.get(offset + 7)?,
    })
}

/// Read a TEXT column into one of the status/role enums.
pub(crate) fn text_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, sql: &str, key: P) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(sql)?;

    let row = stmt
        .query_row([key], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                name: row.get(3)?,
                contact: row.get(4)?,
                role: text_enum(row, 5)?,
                is_active: row.get(6)?,
                created_at: row.get(7)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn exists(conn: &Connection, sql: &str, key: &str) -> Result<bool> {
    let found: bool = conn.query_row(sql, [key], |row| row.get(0))?;
    Ok(found)
}

/// `?start, ?start+1, ...` for `count` parameters.
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
