//! Platform authentication helpers.
//!
//! Accounts are configured in memory; [`AuthnService::demo`] carries the two
//! sample logins used by the admin dashboard. Sessions only store the user
//! id, the full [`SessionUser`] is looked up on every request.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthnError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("unknown user: {0}")]
    UnknownUser(String),
}

/// Authenticated principal as exposed to handlers.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Account {
    pub user: SessionUser,
    pub password: String,
}

impl Account {
    pub fn new(user: SessionUser, password: impl Into<String>) -> Self {
        Self {
            user,
            password: password.into(),
        }
    }
}

#[derive(Default, Debug, Clone)]
pub struct AuthnService {
    accounts: Vec<Account>,
}

impl AuthnService {
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    /// Sample administrator and employee logins.
    pub fn demo() -> Self {
        let admin = SessionUser {
            id: "1".into(),
            name: "Admin User".into(),
            email: "admin@example.com".into(),
            role: "Administrator".into(),
            permissions: vec![
                "settings:read".into(),
                "settings:write".into(),
                "users:read".into(),
                "users:write".into(),
            ],
        };
        let employee = SessionUser {
            id: "2".into(),
            name: "Regular User".into(),
            email: "user@example.com".into(),
            role: "Employee".into(),
            permissions: vec!["settings:read".into()],
        };
        Self::default()
            .with_account(Account::new(admin, "password"))
            .with_account(Account::new(employee, "password"))
    }

    pub fn login(&self, email: &str, password: &str) -> Result<SessionUser, AuthnError> {
        let account = self
            .accounts
            .iter()
            .find(|account| account.user.email.eq_ignore_ascii_case(email.trim()));
        match account {
            Some(account) if account.password == password => {
                info!(user_id = %account.user.id, "login succeeded");
                Ok(account.user.clone())
            }
            _ => {
                warn!("login rejected");
                Err(AuthnError::InvalidCredentials)
            }
        }
    }

    pub fn user(&self, id: &str) -> Result<&SessionUser, AuthnError> {
        self.accounts
            .iter()
            .map(|account| &account.user)
            .find(|user| user.id == id)
            .ok_or_else(|| AuthnError::UnknownUser(id.into()))
    }
}
