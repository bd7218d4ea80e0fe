// Identifier value objects

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Lowercases and trims an email so that `" Foo@Bar.com "` and `"foo@bar.com"`
/// address the same player.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn required(raw: &str, field: &'static str) -> Result<String, IdentityError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdentityError::Missing(field));
    }
    Ok(trimmed.to_string())
}

/// The (email, username) identity shared by summaries, ledgers and saves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey {
    email: String,
    username: String,
}

impl PlayerKey {
    pub fn new(email: &str, username: &str) -> Result<Self, IdentityError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(IdentityError::Missing("email"));
        }
        let username = required(username, "username")?;
        Ok(Self { email, username })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.email, self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: &str) -> Result<Self, IdentityError> {
        required(raw, "deviceId").map(Self)
    }

    /// Report calls treat a blank device id as "nothing to record".
    pub fn optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| Self::new(value).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AchievementKey(String);

impl AchievementKey {
    pub fn new(raw: &str) -> Result<Self, IdentityError> {
        required(raw, "achievementKey").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_key_normalizes_email_and_trims_username() {
        let key = PlayerKey::new("  Hero@Example.COM ", " Knight ").expect("player key");
        assert_eq!(key.email(), "hero@example.com");
        assert_eq!(key.username(), "Knight");
        assert_eq!(key, PlayerKey::new("hero@example.com", "Knight").expect("same key"));
    }

    #[test]
    fn player_key_rejects_blank_fields() {
        assert_eq!(
            PlayerKey::new("   ", "knight").expect_err("blank email"),
            IdentityError::Missing("email")
        );
        assert_eq!(
            PlayerKey::new("hero@example.com", "").expect_err("blank username"),
            IdentityError::Missing("username")
        );
    }

    #[test]
    fn blank_device_id_is_treated_as_absent() {
        assert!(DeviceId::optional(None).is_none());
        assert!(DeviceId::optional(Some("  ")).is_none());
        assert_eq!(
            DeviceId::optional(Some(" pixel-7 ")).map(|d| d.as_str().to_string()),
            Some("pixel-7".to_string())
        );
    }

    #[test]
    fn achievement_key_is_trimmed() {
        let key = AchievementKey::new(" first_blood ").expect("key");
        assert_eq!(key.as_str(), "first_blood");
        assert!(AchievementKey::new("\t").is_err());
    }
}
