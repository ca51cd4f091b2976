use serde::{Deserialize, Serialize};

use crate::contacts::model::Contact;

/// Fields shared by the add and edit forms.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl ContactForm {
    /// Trimmed name, phone and email; a blank email becomes `None`.
    pub fn into_trimmed(self) -> (String, String, Option<String>) {
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        (self.name.trim().to_string(), self.phone.trim().to_string(), email)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub choice: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ContactList {
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub contacts: Vec<Contact>,
}
