//! One-shot messages carried across a redirect in a cookie.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const FLASH_COOKIE: &str = "trial_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

/// Queue a message for the next rendered page.
pub fn push(jar: CookieJar, level: Level, text: impl Into<String>) -> CookieJar {
    let mut pending = read(&jar);
    pending.push(FlashMessage {
        level,
        text: text.into(),
    });

    let encoded = match serde_json::to_vec(&pending) {
        Ok(json) => B64.encode(json),
        Err(e) => {
            warn!("Dropping flash message, encode failed: {}", e);
            return jar;
        }
    };

    jar.add(
        Cookie::build((FLASH_COOKIE, encoded))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Remove and return every queued message.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<FlashMessage>) {
    let pending = read(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, pending);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), pending)
}

fn read(jar: &CookieJar) -> Vec<FlashMessage> {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return Vec::new();
    };

    B64.decode(cookie.value())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_else(|| {
            warn!("Ignoring malformed flash cookie");
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_take() {
        let jar = CookieJar::new();
        let jar = push(jar, Level::Success, "Campaign created.");
        let jar = push(jar, Level::Warning, "Heads up.");

        let (jar, messages) = take(jar);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, Level::Success);
        assert_eq!(messages[1].text, "Heads up.");

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn test_garbage_cookie_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "%%%not-base64"));
        let (_, messages) = take(jar);
        assert!(messages.is_empty());
    }
}
