use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;
use minijinja::{Environment, Value, context};
use serde::Serialize;
use tracing::error;

use trial_types::api::Claims;
use trial_types::status::{CampaignStatus, ProposalStatus};

use crate::flash;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("campaign_detail.html", include_str!("../templates/campaign_detail.html")),
    ("campaign_manage.html", include_str!("../templates/campaign_manage.html")),
    ("advertiser_campaign_detail.html", include_str!("../templates/advertiser_campaign_detail.html")),
    ("proposal_create.html", include_str!("../templates/proposal_create.html")),
    ("my_proposals.html", include_str!("../templates/my_proposals.html")),
    ("signup.html", include_str!("../templates/signup.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
];

/// Compiled page templates, embedded in the binary.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn load() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_filter("status_label", status_label);
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render(&self, name: &str, ctx: Value) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }

    /// Render a full page: layout gets the viewer and any pending flash
    /// messages, which are consumed from `jar`.
    pub fn page<S: Serialize>(
        &self,
        jar: CookieJar,
        viewer: Option<&Claims>,
        name: &str,
        ctx: S,
    ) -> Response {
        self.page_with_status(StatusCode::OK, jar, viewer, name, ctx)
    }

    pub fn page_with_status<S: Serialize>(
        &self,
        status: StatusCode,
        jar: CookieJar,
        viewer: Option<&Claims>,
        name: &str,
        ctx: S,
    ) -> Response {
        let (jar, messages) = flash::take(jar);
        let ctx = context! {
            viewer => viewer,
            messages => messages,
            ..Value::from_serialize(&ctx)
        };

        match self.render(name, ctx) {
            Ok(html) => (status, jar, Html(html)).into_response(),
            Err(e) => {
                error!("Failed to render {}: {:#}", name, e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// `{{ campaign.status|status_label }}` → "Recruitment ended".
fn status_label(value: String) -> String {
    if let Ok(status) = value.parse::<CampaignStatus>() {
        return status.label().to_string();
    }
    if let Ok(status) = value.parse::<ProposalStatus>() {
        return status.label().to_string();
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label_filter() {
        assert_eq!(status_label("recruitment_ended".into()), "Recruitment ended");
        assert_eq!(status_label("rejected".into()), "Rejected");
        assert_eq!(status_label("mystery".into()), "mystery");
    }

    #[test]
    fn test_all_templates_compile() {
        Templates::load().unwrap();
    }

    #[test]
    fn test_layout_escapes_and_shows_flash() {
        let templates = Templates::load().unwrap();
        let html = templates
            .render(
                "not_found.html",
                context! {
                    viewer => None::<Claims>,
                    messages => vec![flash::FlashMessage {
                        level: flash::Level::Error,
                        text: "<b>nope</b>".into(),
                    }],
                },
            )
            .unwrap();
        assert!(html.contains("&lt;b&gt;nope&lt;/b&gt;"));
    }
}
