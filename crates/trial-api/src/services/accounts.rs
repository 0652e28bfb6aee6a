use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::info;

use trial_db::Database;
use trial_db::models::NewUser;
use trial_db::queries::{
    contact_exists, email_exists, insert_advertiser_profile, insert_influencer_profile,
    insert_user, registration_number_exists,
};
use trial_types::api::{SignupDto, SignupProfile};
use trial_types::models::User;

use crate::error::{ServiceError, ServiceResult};

/// Create the account and its role profile in one transaction.
pub fn signup(db: &Database, dto: &SignupDto) -> ServiceResult<User> {
    let password_hash = hash_password(&dto.password)?;
    let role = dto.profile.role();

    let user_id = db.transaction(|tx| {
        if email_exists(tx, &dto.email)? {
            return Err(ServiceError::duplicate("This email is already registered."));
        }
        if contact_exists(tx, &dto.contact)? {
            return Err(ServiceError::duplicate("This contact number is already registered."));
        }

        let user_id = insert_user(
            tx,
            &NewUser {
                email: &dto.email,
                password_hash: &password_hash,
                name: &dto.name,
                contact: &dto.contact,
                role,
            },
        )?;

        match &dto.profile {
            SignupProfile::Advertiser {
                company_name,
                business_registration_number,
            } => {
                if registration_number_exists(tx, business_registration_number)? {
                    return Err(ServiceError::duplicate(
                        "This business registration number is already registered.",
                    ));
                }
                insert_advertiser_profile(tx, user_id, company_name, business_registration_number)?;
            }
            SignupProfile::Influencer {
                birth_date,
                sns_link,
            } => {
                insert_influencer_profile(tx, user_id, *birth_date, sns_link)?;
            }
        }

        Ok(user_id)
    })?;

    info!("New {} account {} ({})", role, user_id, dto.email);

    db.get_user_by_id(user_id)?
        .map(User::from)
        .ok_or_else(|| ServiceError::Internal(anyhow::anyhow!("User {} missing after signup", user_id)))
}

/// Check an email/password pair. `None` for unknown email, wrong password or
/// a deactivated account; the caller shows the same message for all three.
pub fn authenticate(db: &Database, email: &str, password: &str) -> ServiceResult<Option<User>> {
    let Some(row) = db.get_user_by_email(&email.trim().to_lowercase())? else {
        return Ok(None);
    };

    let parsed_hash = PasswordHash::new(&row.password)
        .map_err(|e| anyhow::anyhow!("Stored password hash for user {} is invalid: {}", row.id, e))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Ok(None);
    }

    if !row.is_active {
        return Ok(None);
    }

    Ok(Some(row.into()))
}

fn hash_password(password: &str) -> ServiceResult<String> {
    // Argon2id with default params
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn influencer_dto(email: &str, contact: &str) -> SignupDto {
        SignupDto {
            email: email.into(),
            password: "secret123".into(),
            name: "Ina".into(),
            contact: contact.into(),
            profile: SignupProfile::Influencer {
                birth_date: NaiveDate::from_ymd_opt(1999, 4, 1).unwrap(),
                sns_link: "https://blog.example.com/ina".into(),
            },
        }
    }

    fn advertiser_dto(email: &str, contact: &str, brn: &str) -> SignupDto {
        SignupDto {
            email: email.into(),
            password: "secret123".into(),
            name: "Ada".into(),
            contact: contact.into(),
            profile: SignupProfile::Advertiser {
                company_name: "Acme Foods".into(),
                business_registration_number: brn.into(),
            },
        }
    }

    #[test]
    fn test_signup_creates_user_and_profile() {
        let db = Database::open_in_memory().unwrap();
        let user = signup(&db, &influencer_dto("ina@example.com", "010-1")).unwrap();
        assert_eq!(user.role, trial_types::status::Role::Influencer);
        assert!(db.get_influencer_profile(user.id).unwrap().is_some());
        assert!(db.get_advertiser_profile(user.id).unwrap().is_none());

        let ada = signup(&db, &advertiser_dto("ada@example.com", "010-2", "123-45-67890")).unwrap();
        let profile = db.get_advertiser_profile(ada.id).unwrap().unwrap();
        assert_eq!(profile.company_name, "Acme Foods");
    }

    #[test]
    fn test_signup_duplicates() {
        let db = Database::open_in_memory().unwrap();
        signup(&db, &advertiser_dto("ada@example.com", "010-1", "123-45-67890")).unwrap();

        let same_email = signup(&db, &influencer_dto("ada@example.com", "010-9"));
        assert!(matches!(same_email, Err(ServiceError::Duplicate(_))));

        let same_contact = signup(&db, &influencer_dto("new@example.com", "010-1"));
        assert!(matches!(same_contact, Err(ServiceError::Duplicate(_))));

        let same_brn = signup(&db, &advertiser_dto("b@example.com", "010-3", "123-45-67890"));
        assert!(matches!(same_brn, Err(ServiceError::Duplicate(_))));
        // the failed signup left no half-created user behind
        assert!(db.get_user_by_email("b@example.com").unwrap().is_none());
    }

    #[test]
    fn test_authenticate() {
        let db = Database::open_in_memory().unwrap();
        let user = signup(&db, &influencer_dto("ina@example.com", "010-1")).unwrap();

        let ok = authenticate(&db, "INA@example.com", "secret123").unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));
        assert!(authenticate(&db, "ina@example.com", "wrong-pass1").unwrap().is_none());
        assert!(authenticate(&db, "who@example.com", "secret123").unwrap().is_none());
    }

    #[test]
    fn test_inactive_user_cannot_log_in() {
        let db = Database::open_in_memory().unwrap();
        let user = signup(&db, &influencer_dto("ina@example.com", "010-1")).unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE users SET is_active = 0 WHERE id = ?1", [user.id])?;
            Ok(())
        })
        .unwrap();

        assert!(authenticate(&db, "ina@example.com", "secret123").unwrap().is_none());
    }
}
