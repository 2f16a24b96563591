use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<GenderKind>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub timezone: String,
    pub preferences: Json<UserPreferences>,
    pub is_active: bool,
    pub email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "gender_kind", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum GenderKind {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    pub theme: Theme,
    pub notifications: NotificationPrefs,
    pub privacy: PrivacyPrefs,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

impl Default for Theme {
    fn default() -> Self {
        Self::Auto
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationPrefs {
    pub email: bool,
    pub mood_reminders: bool,
    pub journal_reminders: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            email: true,
            mood_reminders: true,
            journal_reminders: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PrivacyPrefs {
    pub profile_visibility: ProfileVisibility,
    pub data_sharing: bool,
}

impl Default for PrivacyPrefs {
    fn default() -> Self {
        Self {
            profile_visibility: ProfileVisibility::Private,
            data_sharing: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    Public,
    Private,
}

/// Public view of a user account, password hash never included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile: ProfileSection,
    pub preferences: UserPreferences,
    pub is_active: bool,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<GenderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub timezone: String,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            profile: ProfileSection {
                first_name: u.first_name,
                last_name: u.last_name,
                date_of_birth: u.date_of_birth,
                gender: u.gender,
                avatar: u.avatar,
                bio: u.bio,
                timezone: u.timezone,
            },
            preferences: u.preferences.0,
            is_active: u.is_active,
            email_verified: u.email_verified,
            last_login: u.last_login_at,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    pub profile: Option<ProfilePatch>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Nested `profile` object accepted by registration and profile updates.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[validate(length(max = 50, message = "First name cannot exceed 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 50, message = "Last name cannot exceed 50 characters"))]
    pub last_name: Option<String>,

    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<GenderKind>,
    pub avatar: Option<String>,

    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,

    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate]
    pub profile: Option<ProfilePatch>,
}

/// Partial preference update; omitted fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub theme: Option<Theme>,
    pub notifications: Option<NotificationsPatch>,
    pub privacy: Option<PrivacyPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationsPatch {
    pub email: Option<bool>,
    pub mood_reminders: Option<bool>,
    pub journal_reminders: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrivacyPatch {
    pub profile_visibility: Option<ProfileVisibility>,
    pub data_sharing: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub preferences: Option<PreferencesPatch>,
}

impl UserPreferences {
    /// Merge a partial update, leaving untouched fields as-is.
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(n) = patch.notifications {
            if let Some(v) = n.email {
                self.notifications.email = v;
            }
            if let Some(v) = n.mood_reminders {
                self.notifications.mood_reminders = v;
            }
            if let Some(v) = n.journal_reminders {
                self.notifications.journal_reminders = v;
            }
        }
        if let Some(p) = patch.privacy {
            if let Some(v) = p.profile_visibility {
                self.privacy.profile_visibility = v;
            }
            if let Some(v) = p.data_sharing {
                self.privacy.data_sharing = v;
            }
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(
        length(min = 6, message = "New password must be at least 6 characters long"),
        custom = "validate_password_strength"
    )]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteAccountRequest {
    #[validate(length(min = 1, message = "Password is required to delete account"))]
    pub password: String,
}

fn validate_password_strength(password: &str) -> Result<(), validator::ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_lower && has_upper && has_digit {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("password_strength");
        err.message = Some(
            "New password must contain at least one lowercase letter, one uppercase letter, and one number"
                .into(),
        );
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_default_shape() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.theme, Theme::Auto);
        assert!(prefs.notifications.email);
        assert!(prefs.notifications.mood_reminders);
        assert!(prefs.notifications.journal_reminders);
        assert_eq!(prefs.privacy.profile_visibility, ProfileVisibility::Private);
        assert!(!prefs.privacy.data_sharing);
    }

    #[test]
    fn preferences_partial_apply_keeps_other_fields() {
        let mut prefs = UserPreferences::default();
        prefs.apply(PreferencesPatch {
            theme: Some(Theme::Dark),
            notifications: Some(NotificationsPatch {
                email: Some(false),
                ..Default::default()
            }),
            privacy: None,
        });

        assert_eq!(prefs.theme, Theme::Dark);
        assert!(!prefs.notifications.email);
        assert!(prefs.notifications.mood_reminders);
        assert_eq!(prefs.privacy.profile_visibility, ProfileVisibility::Private);
    }

    #[test]
    fn preferences_roundtrip_from_partial_json() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"theme": "dark"}"#).expect("partial json");
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.notifications.email);
    }

    #[test]
    fn password_strength_rules() {
        assert!(validate_password_strength("Abc123").is_ok());
        assert!(validate_password_strength("abc123").is_err());
        assert!(validate_password_strength("ABC123").is_err());
        assert!(validate_password_strength("Abcdef").is_err());
    }
}
