use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            name        TEXT NOT NULL,
            contact     TEXT NOT NULL UNIQUE,
            role        TEXT NOT NULL CHECK (role IN ('advertiser', 'influencer')),
            is_active   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        CREATE TABLE IF NOT EXISTS advertiser_profiles (
            user_id                         INTEGER PRIMARY KEY REFERENCES users(id),
            company_name                    TEXT NOT NULL,
            business_registration_number    TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        CREATE TABLE IF NOT EXISTS influencer_profiles (
            user_id     INTEGER PRIMARY KEY REFERENCES users(id),
            birth_date  TEXT NOT NULL,
            sns_link    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        CREATE TABLE IF NOT EXISTS campaigns (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            advertiser_id           INTEGER NOT NULL REFERENCES users(id),
            name                    TEXT NOT NULL,
            recruitment_start_date  TEXT NOT NULL,
            recruitment_end_date    TEXT NOT NULL,
            recruitment_count       INTEGER NOT NULL CHECK (recruitment_count >= 1),
            benefits                TEXT NOT NULL,
            mission                 TEXT NOT NULL,
            status                  TEXT NOT NULL DEFAULT 'recruiting'
                CHECK (status IN ('recruiting', 'recruitment_ended', 'selection_complete')),
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_campaigns_status
            ON campaigns(status, created_at);
        CREATE INDEX IF NOT EXISTS idx_campaigns_advertiser
            ON campaigns(advertiser_id, created_at);

        CREATE TABLE IF NOT EXISTS proposals (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            campaign_id         INTEGER NOT NULL REFERENCES campaigns(id),
            influencer_id       INTEGER NOT NULL REFERENCES users(id),
            cover_letter        TEXT NOT NULL,
            desired_visit_date  TEXT NOT NULL,
            status              TEXT NOT NULL DEFAULT 'submitted'
                CHECK (status IN ('submitted', 'selected', 'rejected')),
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            UNIQUE(campaign_id, influencer_id)
        );

        CREATE INDEX IF NOT EXISTS idx_proposals_influencer
            ON proposals(influencer_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
