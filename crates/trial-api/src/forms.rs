//! Input validation for submitted forms.
//!
//! Each `validate_*` turns a raw form payload into the DTO a service takes,
//! or the per-field messages to show next to the inputs. Rules that need the
//! database (uniqueness, campaign state) live in the services.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use url::Url;

use trial_types::api::{
    CampaignCreateDto, CampaignCreateForm, InfluencerSelectionDto, ProposalCreateDto,
    ProposalCreateForm, SelectInfluencersForm, SignupDto, SignupForm, SignupProfile,
};
use trial_types::models::CampaignId;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_INFLUENCER_AGE: i32 = 14;
pub const MAX_COVER_LETTER_LEN: usize = 500;
pub const MAX_SNS_LINK_LEN: usize = 500;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<&'static str, String>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    /// Record an error for `field`; the first message per field wins.
    pub fn add(&mut self, field: &'static str, msg: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| msg.into());
    }

    pub fn add_non_field(&mut self, msg: impl Into<String>) {
        self.non_field.push(msg.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// All messages, field errors first, for flashing.
    pub fn messages(&self) -> Vec<String> {
        self.fields
            .values()
            .cloned()
            .chain(self.non_field.iter().cloned())
            .collect()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

// -- Signup --

pub fn validate_signup(form: &SignupForm, today: NaiveDate) -> Result<SignupDto, FormErrors> {
    let mut errors = FormErrors::default();

    let email = form.email.trim().to_lowercase();
    if email.is_empty() {
        errors.add("email", "Enter your email address.");
    } else if email.len() > 255 || !looks_like_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }

    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 8 characters.");
    } else if !form.password.chars().any(|c| c.is_ascii_alphabetic())
        || !form.password.chars().any(|c| c.is_ascii_digit())
    {
        errors.add("password", "Password must contain both letters and numbers.");
    }
    if form.password_confirm.is_empty() {
        errors.add("password_confirm", "Confirm your password.");
    } else if form.password != form.password_confirm {
        errors.add_non_field("Passwords do not match.");
    }

    let name = form.name.trim();
    required_max(&mut errors, "name", name, 100, "Enter your name.");
    let contact = form.contact.trim();
    required_max(&mut errors, "contact", contact, 20, "Enter a contact number.");

    if form.terms_agreed.is_none() {
        errors.add(
            "terms_agreed",
            "You must agree to the terms of service and privacy policy.",
        );
    }

    let profile = match form.role.as_str() {
        "advertiser" => validate_advertiser_fields(form, &mut errors),
        "influencer" => validate_influencer_fields(form, today, &mut errors),
        "" => {
            errors.add("role", "Choose an account type.");
            None
        }
        _ => {
            errors.add("role", "Choose a valid account type.");
            None
        }
    };

    match profile {
        Some(profile) if errors.is_empty() => Ok(SignupDto {
            email,
            password: form.password.clone(),
            name: name.to_string(),
            contact: contact.to_string(),
            profile,
        }),
        _ => Err(errors),
    }
}

fn validate_advertiser_fields(form: &SignupForm, errors: &mut FormErrors) -> Option<SignupProfile> {
    let company_name = form.company_name.trim();
    required_max(errors, "company_name", company_name, 255, "Enter your company name.");

    let number = form.business_registration_number.trim();
    if number.is_empty() {
        errors.add(
            "business_registration_number",
            "Enter your business registration number.",
        );
    } else if !is_registration_number(number) {
        errors.add(
            "business_registration_number",
            "Business registration number must look like XXX-XX-XXXXX.",
        );
    }

    Some(SignupProfile::Advertiser {
        company_name: company_name.to_string(),
        business_registration_number: number.to_string(),
    })
}

fn validate_influencer_fields(
    form: &SignupForm,
    today: NaiveDate,
    errors: &mut FormErrors,
) -> Option<SignupProfile> {
    let birth_date = match parse_date(&form.birth_date) {
        DateField::Missing => {
            errors.add("birth_date", "Enter your date of birth.");
            None
        }
        DateField::Invalid => {
            errors.add("birth_date", "Enter a valid date.");
            None
        }
        DateField::Valid(d) if d > today || age_on(d, today) < MIN_INFLUENCER_AGE => {
            errors.add("birth_date", "You must be at least 14 years old to sign up.");
            None
        }
        DateField::Valid(d) => Some(d),
    };

    let sns_link = form.sns_link.trim();
    if sns_link.is_empty() {
        errors.add("sns_link", "Enter a link to your social media channel.");
    } else if sns_link.len() > MAX_SNS_LINK_LEN || !looks_like_http_url(sns_link) {
        errors.add("sns_link", "Enter a valid URL.");
    }

    birth_date.map(|birth_date| SignupProfile::Influencer {
        birth_date,
        sns_link: sns_link.to_string(),
    })
}

/// Full years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let had_birthday = (today.month(), today.day()) >= (birth.month(), birth.day());
    today.year() - birth.year() - if had_birthday { 0 } else { 1 }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn looks_like_http_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// `XXX-XX-XXXXX`, digits only.
fn is_registration_number(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    groups.len() == 3
        && [3, 2, 5]
            .iter()
            .zip(&groups)
            .all(|(len, g)| g.len() == *len && g.bytes().all(|b| b.is_ascii_digit()))
}

// -- Campaigns --

pub fn validate_campaign(form: &CampaignCreateForm) -> Result<CampaignCreateDto, FormErrors> {
    let mut errors = FormErrors::default();

    let name = form.name.trim();
    required_max(&mut errors, "name", name, 255, "Enter a campaign name.");

    let start = required_date(&mut errors, "recruitment_start_date", &form.recruitment_start_date);
    let end = required_date(&mut errors, "recruitment_end_date", &form.recruitment_end_date);
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.add_non_field("The recruitment end date must be on or after the start date.");
        }
    }

    let count = match form.recruitment_count.trim() {
        "" => {
            errors.add("recruitment_count", "Enter how many people to recruit.");
            None
        }
        raw => match raw.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.add("recruitment_count", "Enter a whole number.");
                None
            }
        },
    };

    let benefits = form.benefits.trim();
    if benefits.is_empty() {
        errors.add("benefits", "Describe the benefits offered.");
    }
    let mission = form.mission.trim();
    if mission.is_empty() {
        errors.add("mission", "Describe the mission.");
    }

    match (start, end, count) {
        (Some(start), Some(end), Some(count)) => errors.finish(|| CampaignCreateDto {
            name: name.to_string(),
            recruitment_start_date: start,
            recruitment_end_date: end,
            recruitment_count: count,
            benefits: benefits.to_string(),
            mission: mission.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Parse the checked proposal ids. Non-numeric values are dropped and
/// duplicates collapsed, keeping first-seen order.
pub fn selection_from_form(campaign_id: CampaignId, form: &SelectInfluencersForm) -> InfluencerSelectionDto {
    let mut ids = Vec::new();
    for raw in &form.selected_proposals {
        let raw = raw.trim();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(id) = raw.parse::<i64>() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    InfluencerSelectionDto {
        campaign_id,
        selected_proposal_ids: ids,
    }
}

// -- Proposals --

pub fn validate_proposal(
    campaign_id: CampaignId,
    form: &ProposalCreateForm,
    today: NaiveDate,
) -> Result<ProposalCreateDto, FormErrors> {
    let mut errors = FormErrors::default();

    let cover_letter = form.cover_letter.trim();
    if cover_letter.is_empty() {
        errors.add("cover_letter", "Tell the advertiser why you should be selected.");
    } else if cover_letter.chars().count() > MAX_COVER_LETTER_LEN {
        errors.add("cover_letter", "Keep it within 500 characters.");
    }

    let visit = match parse_date(&form.desired_visit_date) {
        DateField::Missing => {
            errors.add("desired_visit_date", "Choose a desired visit date.");
            None
        }
        DateField::Invalid => {
            errors.add("desired_visit_date", "Enter a valid date.");
            None
        }
        DateField::Valid(d) if d < today => {
            errors.add("desired_visit_date", "Choose today or a later date.");
            None
        }
        DateField::Valid(d) => Some(d),
    };

    match visit {
        Some(desired_visit_date) => errors.finish(|| ProposalCreateDto {
            campaign_id,
            cover_letter: cover_letter.to_string(),
            desired_visit_date,
        }),
        None => Err(errors),
    }
}

// -- Helpers --

enum DateField {
    Missing,
    Invalid,
    Valid(NaiveDate),
}

fn parse_date(raw: &str) -> DateField {
    let raw = raw.trim();
    if raw.is_empty() {
        return DateField::Missing;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => DateField::Valid(d),
        Err(_) => DateField::Invalid,
    }
}

fn required_date(errors: &mut FormErrors, field: &'static str, raw: &str) -> Option<NaiveDate> {
    match parse_date(raw) {
        DateField::Valid(d) => Some(d),
        DateField::Missing => {
            errors.add(field, "This date is required.");
            None
        }
        DateField::Invalid => {
            errors.add(field, "Enter a valid date.");
            None
        }
    }
}

fn required_max(errors: &mut FormErrors, field: &'static str, value: &str, max: usize, missing: &str) {
    if value.is_empty() {
        errors.add(field, missing);
    } else if value.chars().count() > max {
        errors.add(field, format!("Use at most {} characters.", max));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 10).unwrap()
    }

    fn influencer_form() -> SignupForm {
        SignupForm {
            email: " Ina@Example.com ".into(),
            password: "secret123".into(),
            password_confirm: "secret123".into(),
            name: "Ina".into(),
            contact: "010-1234-5678".into(),
            role: "influencer".into(),
            terms_agreed: Some("on".into()),
            birth_date: "2000-02-29".into(),
            sns_link: "https://blog.example.com/ina".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_influencer_signup() {
        let dto = validate_signup(&influencer_form(), today()).unwrap();
        assert_eq!(dto.email, "ina@example.com");
        assert!(matches!(dto.profile, SignupProfile::Influencer { .. }));
    }

    #[test]
    fn test_advertiser_signup_checks_registration_number() {
        let mut form = influencer_form();
        form.role = "advertiser".into();
        form.company_name = "Acme Foods".into();
        form.business_registration_number = "123-45-6789".into();

        let errors = validate_signup(&form, today()).unwrap_err();
        assert!(errors.fields.contains_key("business_registration_number"));

        form.business_registration_number = "123-45-67890".into();
        let dto = validate_signup(&form, today()).unwrap();
        assert_eq!(dto.profile.role(), trial_types::status::Role::Advertiser);
    }

    #[test]
    fn test_signup_rejects_weak_or_mismatched_password() {
        let mut form = influencer_form();
        form.password = "onlyletters".into();
        form.password_confirm = "onlyletters".into();
        let errors = validate_signup(&form, today()).unwrap_err();
        assert!(errors.fields.contains_key("password"));

        let mut form = influencer_form();
        form.password_confirm = "secret124".into();
        let errors = validate_signup(&form, today()).unwrap_err();
        assert_eq!(errors.non_field, vec!["Passwords do not match.".to_string()]);
    }

    #[test]
    fn test_signup_requires_terms_and_age() {
        let mut form = influencer_form();
        form.terms_agreed = None;
        form.birth_date = "2013-05-11".into();
        let errors = validate_signup(&form, today()).unwrap_err();
        assert!(errors.fields.contains_key("terms_agreed"));
        assert!(errors.fields.contains_key("birth_date"));
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let birth = NaiveDate::from_ymd_opt(2012, 5, 10).unwrap();
        assert_eq!(age_on(birth, today()), 14);
        assert_eq!(age_on(birth, today().pred_opt().unwrap()), 13);
    }

    #[test]
    fn test_email_and_url_shapes() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a b@c.com"));
        assert!(looks_like_http_url("http://insta.example/x"));
        assert!(!looks_like_http_url("ftp://insta.example"));
        assert!(!looks_like_http_url("https://"));
    }

    #[test]
    fn test_malformed_sns_links_are_rejected() {
        for link in ["http://exa<mple>.com", "https://:::", "http://[::1", "https://exa mple.com"] {
            assert!(!looks_like_http_url(link), "{link} should be rejected");
        }
        assert!(looks_like_http_url("https://www.instagram.com/ina_eats?hl=en"));

        let form = SignupForm {
            sns_link: "http://exa<mple>.com".into(),
            ..influencer_form()
        };
        let errors = validate_signup(&form, today()).unwrap_err();
        assert_eq!(errors.fields.get("sns_link").map(String::as_str), Some("Enter a valid URL."));
    }

    #[test]
    fn test_campaign_form() {
        let form = CampaignCreateForm {
            name: "Brunch".into(),
            recruitment_start_date: "2026-05-01".into(),
            recruitment_end_date: "2026-05-20".into(),
            recruitment_count: "3".into(),
            benefits: "Brunch for two".into(),
            mission: "Post".into(),
        };
        let dto = validate_campaign(&form).unwrap();
        assert_eq!(dto.recruitment_count, 3);

        let backwards = CampaignCreateForm {
            recruitment_end_date: "2026-04-30".into(),
            ..form.clone()
        };
        assert_eq!(validate_campaign(&backwards).unwrap_err().non_field.len(), 1);

        let bad_count = CampaignCreateForm {
            recruitment_count: "three".into(),
            ..form
        };
        assert!(validate_campaign(&bad_count)
            .unwrap_err()
            .fields
            .contains_key("recruitment_count"));
    }

    #[test]
    fn test_selection_drops_junk_and_duplicates() {
        let form = SelectInfluencersForm {
            selected_proposals: vec!["3".into(), "x".into(), "1".into(), "3".into(), "-2".into()],
        };
        let dto = selection_from_form(9, &form);
        assert_eq!(dto.campaign_id, 9);
        assert_eq!(dto.selected_proposal_ids, vec![3, 1]);
    }

    #[test]
    fn test_proposal_form() {
        let form = ProposalCreateForm {
            cover_letter: "  I love brunch  ".into(),
            desired_visit_date: "2026-05-10".into(),
        };
        let dto = validate_proposal(4, &form, today()).unwrap();
        assert_eq!(dto.cover_letter, "I love brunch");

        let past = ProposalCreateForm {
            desired_visit_date: "2026-05-09".into(),
            ..form.clone()
        };
        assert!(validate_proposal(4, &past, today()).is_err());

        let long = ProposalCreateForm {
            cover_letter: "x".repeat(501),
            ..form
        };
        assert!(validate_proposal(4, &long, today())
            .unwrap_err()
            .fields
            .contains_key("cover_letter"));
    }
}
