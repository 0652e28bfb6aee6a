use tracing::info;

use trial_db::Database;
use trial_db::queries::{find_campaign, update_campaign_status};
use trial_types::api::{Actor, CampaignCreateDto};
use trial_types::models::{Campaign, CampaignId};
use trial_types::status::{CampaignEvent, Role};

use crate::error::{ServiceError, ServiceResult};

pub fn create_campaign(db: &Database, actor: Actor, dto: &CampaignCreateDto) -> ServiceResult<Campaign> {
    if actor.role != Role::Advertiser {
        return Err(ServiceError::permission("Only advertisers can create campaigns."));
    }
    if dto.recruitment_end_date < dto.recruitment_start_date {
        return Err(ServiceError::validation(
            "The recruitment end date must be on or after the start date.",
        ));
    }
    if dto.recruitment_count < 1 {
        return Err(ServiceError::validation("Recruit at least one person."));
    }

    let campaign = db.create_campaign(actor.id, dto)?;
    info!("Advertiser {} created campaign {}", actor.id, campaign.id);
    Ok(campaign)
}

/// Stop accepting proposals: recruiting → recruitment_ended.
pub fn close_campaign(db: &Database, actor: Actor, campaign_id: CampaignId) -> ServiceResult<Campaign> {
    let campaign = db.transaction(|tx| {
        let mut campaign = find_campaign(tx, campaign_id)?
            .ok_or_else(|| ServiceError::invalid_state("That campaign does not exist."))?;

        ensure_owner(&campaign, actor)?;

        campaign.status = campaign.status.apply(CampaignEvent::CloseRecruitment)?;
        update_campaign_status(tx, campaign.id, campaign.status)?;
        Ok::<_, ServiceError>(campaign)
    })?;

    info!("Advertiser {} closed recruitment for campaign {}", actor.id, campaign_id);
    Ok(campaign)
}

pub(crate) fn ensure_owner(campaign: &Campaign, actor: Actor) -> ServiceResult<()> {
    if actor.role != Role::Advertiser || campaign.advertiser_id != actor.id {
        return Err(ServiceError::permission(
            "You do not have permission to manage this campaign.",
        ));
    }
    Ok(())
}
