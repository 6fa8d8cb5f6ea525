use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Login body as it arrives on the wire. Any field may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Signup body as it arrives on the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub age: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub disease: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub food_habits: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub gender: Option<String>,
}

/// Free-text profile fields keep whatever the form sent: numbers and
/// booleans become their JSON text, `null` counts as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Username and password, both known to be non-empty.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Signup profile with `username` and `password` checked; everything else is
/// free text and may be empty.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub name: String,
    pub age: String,
    pub username: String,
    pub password: String,
    pub disease: String,
    pub email: String,
    pub phone: String,
    pub food_habits: String,
    pub gender: String,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MissingField(field)),
    }
}

impl TryFrom<CredentialsForm> for Credentials {
    type Error = AppError;

    fn try_from(form: CredentialsForm) -> Result<Self, Self::Error> {
        Ok(Self {
            username: required(form.username, "username")?,
            password: required(form.password, "password")?,
        })
    }
}

impl TryFrom<ProfileForm> for Profile {
    type Error = AppError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        Ok(Self {
            username: required(form.username, "username")?,
            password: required(form.password, "password")?,
            name: form.name.unwrap_or_default(),
            age: form.age.unwrap_or_default(),
            disease: form.disease.unwrap_or_default(),
            email: form.email.unwrap_or_default(),
            phone: form.phone.unwrap_or_default(),
            food_habits: form.food_habits.unwrap_or_default(),
            gender: form.gender.unwrap_or_default(),
        })
    }
}

/// Body of every auth response. `token` only appears when the backend
/// issues one.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthResponse {
    pub fn accepted(token: Option<String>) -> Self {
        Self { ok: true, token }
    }

    pub fn rejected() -> Self {
        Self {
            ok: false,
            token: None,
        }
    }
}
