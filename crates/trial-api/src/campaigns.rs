use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use minijinja::context;
use serde::Serialize;

use trial_types::api::{
    ApplyEligibility, CampaignCard, CampaignCreateForm, CampaignProposalCounts, Claims,
    ProposalDetail, SelectInfluencersForm,
};
use trial_types::models::CampaignId;
use trial_types::status::CampaignStatus;

use crate::error::ServiceError;
use crate::flash::{self, Level};
use crate::forms::{FormErrors, selection_from_form, validate_campaign};
use crate::middleware::CurrentUser;
use crate::services::{campaigns, selection};
use crate::state::{AppState, blocking, today};

const MANAGE_LIST: &str = "/manage/campaigns";

// -- Public pages --

pub async fn home(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, ServiceError> {
    let (banner, campaigns) = blocking(&state, |s| {
        Ok((s.db.latest_recruiting_campaign()?, s.db.recruiting_campaigns()?))
    })
    .await?;

    Ok(state.templates.page(
        jar,
        user.claims(),
        "home.html",
        context! { banner => banner, campaigns => campaigns },
    ))
}

#[derive(Serialize)]
struct DetailPage {
    card: CampaignCard,
    eligibility: ApplyEligibility,
    reason: Option<&'static str>,
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(campaign_id): Path<CampaignId>,
    jar: CookieJar,
) -> Result<Response, ServiceError> {
    let viewer = user.claims().map(Claims::actor);
    let found = blocking(&state, move |s| {
        let Some(card) = s.db.campaign_detail(campaign_id)? else {
            return Ok(None);
        };
        let eligibility = s.db.check_can_apply(&card.campaign, viewer, today())?;
        Ok(Some((card, eligibility)))
    })
    .await?;

    let Some((card, eligibility)) = found else {
        return Ok(not_found(&state, jar, user.claims()));
    };

    let page = DetailPage {
        card,
        eligibility,
        reason: eligibility.reason.map(|r| r.message()),
    };
    Ok(state.templates.page(jar, user.claims(), "campaign_detail.html", page))
}

pub fn not_found(state: &AppState, jar: CookieJar, viewer: Option<&Claims>) -> Response {
    state
        .templates
        .page_with_status(StatusCode::NOT_FOUND, jar, viewer, "not_found.html", context! {})
}

pub async fn fallback(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Response {
    not_found(&state, jar, user.claims())
}

// -- Advertiser pages --

pub async fn manage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<Response, ServiceError> {
    manage_page(&state, jar, &claims, &CampaignCreateForm::default(), &FormErrors::default()).await
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
    Form(form): Form<CampaignCreateForm>,
) -> Result<Response, ServiceError> {
    let dto = match validate_campaign(&form) {
        Ok(dto) => dto,
        Err(errors) => return manage_page(&state, jar, &claims, &form, &errors).await,
    };

    let actor = claims.actor();
    match blocking(&state, move |s| campaigns::create_campaign(&s.db, actor, &dto)).await {
        Ok(campaign) => {
            let jar = flash::push(
                jar,
                Level::Success,
                format!("Campaign \"{}\" has been created.", campaign.name),
            );
            Ok((jar, Redirect::to(MANAGE_LIST)).into_response())
        }
        Err(e) => Ok(e.redirect(jar, MANAGE_LIST)),
    }
}

async fn manage_page(
    state: &AppState,
    jar: CookieJar,
    claims: &Claims,
    form: &CampaignCreateForm,
    errors: &FormErrors,
) -> Result<Response, ServiceError> {
    let advertiser_id = claims.sub;
    let campaigns = blocking(state, move |s| Ok(s.db.campaigns_by_advertiser(advertiser_id)?)).await?;

    Ok(state.templates.page(
        jar,
        Some(claims),
        "campaign_manage.html",
        context! { campaigns => campaigns, form => form, errors => errors },
    ))
}

#[derive(Serialize)]
struct OwnerDetailPage {
    counts: CampaignProposalCounts,
    proposals: Vec<ProposalDetail>,
    can_close: bool,
    can_select: bool,
    is_complete: bool,
}

impl OwnerDetailPage {
    fn new(counts: CampaignProposalCounts, proposals: Vec<ProposalDetail>) -> Self {
        let status = counts.campaign.status;
        Self {
            can_close: status == CampaignStatus::Recruiting,
            can_select: status == CampaignStatus::RecruitmentEnded && counts.submitted_proposals > 0,
            is_complete: status == CampaignStatus::SelectionComplete,
            counts,
            proposals,
        }
    }
}

pub async fn advertiser_detail(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(campaign_id): Path<CampaignId>,
    jar: CookieJar,
) -> Result<Response, ServiceError> {
    let advertiser_id = claims.sub;
    let found = blocking(&state, move |s| {
        let Some(counts) = s.db.campaign_with_proposal_counts(campaign_id, advertiser_id)? else {
            return Ok(None);
        };
        let proposals = s.db.proposals_by_campaign(campaign_id)?;
        Ok(Some(OwnerDetailPage::new(counts, proposals)))
    })
    .await?;

    match found {
        Some(page) => Ok(state.templates.page(
            jar,
            Some(&claims),
            "advertiser_campaign_detail.html",
            page,
        )),
        None => Ok(ServiceError::permission(
            "That campaign does not exist or you do not have permission to manage it.",
        )
        .redirect(jar, MANAGE_LIST)),
    }
}

pub async fn close(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(campaign_id): Path<CampaignId>,
    jar: CookieJar,
) -> Response {
    let actor = claims.actor();
    match blocking(&state, move |s| campaigns::close_campaign(&s.db, actor, campaign_id)).await {
        Ok(campaign) => {
            let jar = flash::push(
                jar,
                Level::Success,
                format!("Recruitment for \"{}\" has been closed.", campaign.name),
            );
            (jar, Redirect::to(&detail_url(campaign_id))).into_response()
        }
        Err(e) => action_failed(e, jar, campaign_id),
    }
}

pub async fn select(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(campaign_id): Path<CampaignId>,
    jar: CookieJar,
    axum_extra::extract::Form(form): axum_extra::extract::Form<SelectInfluencersForm>,
) -> Response {
    let actor = claims.actor();
    let dto = selection_from_form(campaign_id, &form);
    match blocking(&state, move |s| selection::select_influencers(&s.db, actor, &dto)).await {
        Ok(result) => {
            let jar = flash::push(
                jar,
                Level::Success,
                format!(
                    "Selection complete: {} selected, {} not selected.",
                    result.selected_count, result.rejected_count
                ),
            );
            (jar, Redirect::to(&detail_url(campaign_id))).into_response()
        }
        Err(e) => action_failed(e, jar, campaign_id),
    }
}

fn detail_url(campaign_id: CampaignId) -> String {
    format!("/manage/{}", campaign_id)
}

/// Permission failures go back to the list; everything else stays on the
/// campaign's page.
fn action_failed(err: ServiceError, jar: CookieJar, campaign_id: CampaignId) -> Response {
    match err {
        ServiceError::PermissionDenied(_) => err.redirect(jar, MANAGE_LIST),
        _ => err.redirect(jar, &detail_url(campaign_id)),
    }
}
