use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::NaiveDate;
use serde::Serialize;

use trial_types::api::{
    CampaignCard, CannotApplyReason, Claims, InfluencerProposalRow, ProposalCreateForm,
};
use trial_types::models::CampaignId;
use trial_types::status::ProposalStatus;

use crate::campaigns::not_found;
use crate::error::ServiceError;
use crate::flash::{self, Level};
use crate::forms::{FormErrors, validate_proposal};
use crate::services::proposals;
use crate::state::{AppState, blocking, today};

const MY_PROPOSALS: &str = "/proposals";

#[derive(Debug, Default, Serialize)]
struct StatusCounts {
    submitted: i64,
    selected: i64,
    rejected: i64,
    total: i64,
}

#[derive(Serialize)]
struct MyProposalsPage {
    proposals: Vec<InfluencerProposalRow>,
    counts: StatusCounts,
}

pub async fn my_proposals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<Response, ServiceError> {
    let influencer_id = claims.sub;
    let page = blocking(&state, move |s| {
        let proposals = s.db.influencer_proposals(influencer_id)?;
        let by_status = s.db.proposal_counts_by_status(influencer_id)?;
        let count = |status: ProposalStatus| by_status.get(&status).copied().unwrap_or(0);
        let counts = StatusCounts {
            submitted: count(ProposalStatus::Submitted),
            selected: count(ProposalStatus::Selected),
            rejected: count(ProposalStatus::Rejected),
            total: by_status.values().sum(),
        };
        Ok(MyProposalsPage { proposals, counts })
    })
    .await?;

    Ok(state.templates.page(jar, Some(&claims), "my_proposals.html", page))
}

#[derive(Serialize)]
struct ApplyPage<'a> {
    card: CampaignCard,
    form: &'a ProposalCreateForm,
    errors: &'a FormErrors,
    today: NaiveDate,
}

pub async fn apply_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(campaign_id): Path<CampaignId>,
    jar: CookieJar,
) -> Result<Response, ServiceError> {
    let actor = claims.actor();
    let found = blocking(&state, move |s| {
        let Some(card) = s.db.campaign_detail(campaign_id)? else {
            return Ok(None);
        };
        let eligibility = s.db.check_can_apply(&card.campaign, Some(actor), today())?;
        Ok(Some((card, eligibility)))
    })
    .await?;

    let Some((card, eligibility)) = found else {
        return Ok(not_found(&state, jar, Some(&claims)));
    };

    match eligibility.reason {
        None => Ok(apply_form(
            &state,
            jar,
            &claims,
            card,
            &ProposalCreateForm::default(),
            &FormErrors::default(),
        )),
        Some(CannotApplyReason::AlreadyApplied) => {
            let jar = flash::push(jar, Level::Warning, CannotApplyReason::AlreadyApplied.message());
            Ok((jar, Redirect::to(MY_PROPOSALS)).into_response())
        }
        Some(reason) => {
            let jar = flash::push(jar, Level::Error, reason.message());
            Ok((jar, Redirect::to(&campaign_url(campaign_id))).into_response())
        }
    }
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(campaign_id): Path<CampaignId>,
    jar: CookieJar,
    Form(form): Form<ProposalCreateForm>,
) -> Result<Response, ServiceError> {
    let dto = match validate_proposal(campaign_id, &form, today()) {
        Ok(dto) => dto,
        Err(errors) => {
            let card = blocking(&state, move |s| Ok(s.db.campaign_detail(campaign_id)?)).await?;
            return Ok(match card {
                Some(card) => apply_form(&state, jar, &claims, card, &form, &errors),
                None => not_found(&state, jar, Some(&claims)),
            });
        }
    };

    let actor = claims.actor();
    let result = blocking(&state, move |s| {
        proposals::create_proposal(&s.db, actor, &dto, today())
    })
    .await;

    Ok(match result {
        Ok(_) => {
            let jar = flash::push(jar, Level::Success, "Your application has been submitted.");
            (jar, Redirect::to(MY_PROPOSALS)).into_response()
        }
        Err(e @ ServiceError::Duplicate(_)) => e.redirect(jar, MY_PROPOSALS),
        Err(e) => e.redirect(jar, &campaign_url(campaign_id)),
    })
}

fn apply_form(
    state: &AppState,
    jar: CookieJar,
    claims: &Claims,
    card: CampaignCard,
    form: &ProposalCreateForm,
    errors: &FormErrors,
) -> Response {
    let page = ApplyPage {
        card,
        form,
        errors,
        today: today(),
    };
    state
        .templates
        .page(jar, Some(claims), "proposal_create.html", page)
}

fn campaign_url(campaign_id: CampaignId) -> String {
    format!("/campaigns/{}", campaign_id)
}
