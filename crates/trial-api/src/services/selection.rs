use tracing::info;

use trial_db::Database;
use trial_db::queries::{
    count_matching_proposals, count_proposals_with_status, find_campaign, set_proposal_status,
    set_remaining_proposal_status, update_campaign_status,
};
use trial_types::api::{Actor, InfluencerSelectionDto, SelectionResult};
use trial_types::status::{CampaignEvent, ProposalStatus};

use crate::error::{ServiceError, ServiceResult};
use crate::services::campaigns::ensure_owner;

/// Pick the winners of a closed campaign. The chosen proposals become
/// selected, every other submitted proposal is rejected, and the campaign
/// moves to selection_complete, all in one transaction.
pub fn select_influencers(
    db: &Database,
    actor: Actor,
    dto: &InfluencerSelectionDto,
) -> ServiceResult<SelectionResult> {
    let result = db.transaction(|tx| {
        let campaign = find_campaign(tx, dto.campaign_id)?
            .ok_or_else(|| ServiceError::invalid_state("That campaign does not exist."))?;

        ensure_owner(&campaign, actor)?;

        let next_status = campaign
            .status
            .apply(CampaignEvent::CompleteSelection)
            .map_err(|_| {
                ServiceError::invalid_state("Influencers can only be selected after recruitment has ended.")
            })?;

        let mut ids = dto.selected_proposal_ids.clone();
        ids.sort_unstable();
        ids.dedup();
        let ids = ids.as_slice();
        if ids.is_empty() {
            return Err(ServiceError::validation("Select at least one applicant."));
        }
        if ids.len() as i64 > campaign.recruitment_count {
            return Err(ServiceError::validation(format!(
                "You can select at most {} applicant(s); {} were selected.",
                campaign.recruitment_count,
                ids.len()
            )));
        }

        let valid = count_matching_proposals(tx, campaign.id, ids, ProposalStatus::Submitted)?;
        if valid != ids.len() {
            return Err(ServiceError::validation(
                "Some of the selected applicants are not valid for this campaign.",
            ));
        }

        let submitted_before =
            count_proposals_with_status(tx, campaign.id, ProposalStatus::Submitted)?;

        let selected_count = set_proposal_status(
            tx,
            campaign.id,
            ids,
            ProposalStatus::Submitted,
            ProposalStatus::Submitted.decide(true)?,
        )?;
        let rejected_count = set_remaining_proposal_status(
            tx,
            campaign.id,
            ProposalStatus::Submitted,
            ProposalStatus::Submitted.decide(false)?,
        )?;

        if selected_count + rejected_count != submitted_before {
            return Err(ServiceError::Internal(anyhow::anyhow!(
                "Selection for campaign {} touched {} of {} submitted proposals",
                campaign.id,
                selected_count + rejected_count,
                submitted_before
            )));
        }

        update_campaign_status(tx, campaign.id, next_status)?;

        Ok(SelectionResult {
            campaign_id: campaign.id,
            selected_count,
            rejected_count,
            campaign_status: next_status,
        })
    })?;

    info!(
        "Campaign {} selection complete: {} selected, {} rejected",
        result.campaign_id, result.selected_count, result.rejected_count
    );
    Ok(result)
}
