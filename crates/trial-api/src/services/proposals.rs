use tracing::{info, warn};

use trial_db::queries::{find_campaign, insert_proposal, proposal_exists};
use trial_db::{Database, is_constraint_violation};
use trial_types::api::{Actor, ProposalCreateDto};
use trial_types::models::Proposal;
use trial_types::status::Role;

use crate::error::{ServiceError, ServiceResult};

const ALREADY_APPLIED: &str = "You have already applied to this campaign.";

/// Submit an influencer's proposal for a campaign that is open today.
pub fn create_proposal(
    db: &Database,
    actor: Actor,
    dto: &ProposalCreateDto,
    today: chrono::NaiveDate,
) -> ServiceResult<Proposal> {
    if actor.role != Role::Influencer {
        return Err(ServiceError::permission("Only influencers can apply to campaigns."));
    }

    let proposal = db.transaction(|tx| {
        let campaign = find_campaign(tx, dto.campaign_id)?
            .ok_or_else(|| ServiceError::invalid_state("That campaign does not exist."))?;

        if !campaign.accepts_applications(today) {
            return Err(ServiceError::invalid_state(
                "This campaign is not accepting applications.",
            ));
        }

        if proposal_exists(tx, campaign.id, actor.id)? {
            return Err(ServiceError::duplicate(ALREADY_APPLIED));
        }

        insert_proposal(
            tx,
            campaign.id,
            actor.id,
            &dto.cover_letter,
            dto.desired_visit_date,
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                warn!(
                    "Concurrent duplicate proposal from {} for campaign {}",
                    actor.id, campaign.id
                );
                ServiceError::duplicate(ALREADY_APPLIED)
            } else {
                ServiceError::Internal(e)
            }
        })
    })?;

    info!(
        "Influencer {} applied to campaign {} (proposal {})",
        actor.id, proposal.campaign_id, proposal.id
    );
    Ok(proposal)
}
