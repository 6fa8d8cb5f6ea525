use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::{ApiClient, Effect, Route, LOGIN_PATH, SIGNUP_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Login,
    Signup,
}

/// Field state shared by both forms. Switching mode keeps what was typed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
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

impl FormRecord {
    /// Required fields left empty for the given mode, in form order.
    pub fn missing(&self, mode: FormMode) -> Vec<&'static str> {
        let fields: Vec<(&'static str, &str)> = match mode {
            FormMode::Login => vec![
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ],
            FormMode::Signup => vec![
                ("name", self.name.as_str()),
                ("age", self.age.as_str()),
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
                ("disease", self.disease.as_str()),
                ("email", self.email.as_str()),
                ("phone", self.phone.as_str()),
                ("foodHabits", self.food_habits.as_str()),
                ("gender", self.gender.as_str()),
            ],
        };
        fields
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Login/signup landing page.
#[derive(Debug, Default)]
pub struct HomePage {
    mode: FormMode,
    pub form: FormRecord,
}

impl HomePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            FormMode::Login => FormMode::Signup,
            FormMode::Signup => FormMode::Login,
        };
    }

    pub async fn submit(&mut self, api: &dyn ApiClient) -> Vec<Effect> {
        let missing = self.form.missing(self.mode);
        if !missing.is_empty() {
            return vec![Effect::Invalid(missing)];
        }

        let form = &self.form;
        let (path, body, failure) = match self.mode {
            FormMode::Login => (
                LOGIN_PATH,
                json!({ "username": form.username, "password": form.password }),
                "Login failed",
            ),
            FormMode::Signup => (
                SIGNUP_PATH,
                json!({
                    "name": form.name,
                    "age": form.age,
                    "username": form.username,
                    "password": form.password,
                    "disease": form.disease,
                    "email": form.email,
                    "phone": form.phone,
                    "foodHabits": form.food_habits,
                    "gender": form.gender,
                }),
                "Signup failed",
            ),
        };

        match api.post_json(path, body).await {
            Ok(res) if res.is_success() => vec![Effect::Navigate(Route::Dashboard)],
            Ok(res) => {
                warn!(path, status = res.status, "auth request rejected");
                vec![Effect::Alert(failure.into())]
            }
            Err(e) => {
                warn!(path, error = %e, "auth request failed");
                vec![Effect::Alert(failure.into())]
            }
        }
    }
}
