use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const INVALID_DETAILS: &str = "Please enter a valid name and phone number";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("{}", INVALID_DETAILS)]
    InvalidDetails,
}

/// One entry of a user's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub uid: u64,     // unique within the owner's collection
    pub name: String, // non-empty after trimming
    pub phone: String, // exactly ten digits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>, // absent rather than null or ""
}

fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

/// Rejects a blank name or a phone that is not exactly ten decimal digits.
/// Email is never checked.
pub fn validate(name: &str, phone: &str) -> Result<(), ContactError> {
    if name.trim().is_empty() || !is_valid_phone(phone) {
        return Err(ContactError::InvalidDetails);
    }
    Ok(())
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email.filter(|e| !e.is_empty())
}

impl Contact {
    pub fn new(uid: u64, name: String, phone: String, email: Option<String>) -> Self {
        Self {
            uid,
            name,
            phone,
            email: normalize_email(email),
        }
    }

    pub fn validated(
        uid: u64,
        name: String,
        phone: String,
        email: Option<String>,
    ) -> Result<Self, ContactError> {
        validate(&name, &phone)?;
        Ok(Self::new(uid, name, phone, email))
    }

    /// Replaces name, phone and email. Nothing changes when validation fails.
    pub fn update(
        &mut self,
        name: String,
        phone: String,
        email: Option<String>,
    ) -> Result<(), ContactError> {
        validate(&name, &phone)?;
        self.name = name;
        self.phone = phone;
        self.email = normalize_email(email);
        Ok(())
    }
}
