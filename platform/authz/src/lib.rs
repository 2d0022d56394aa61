//! Authorization primitives for the HR admin surfaces.
//!
//! Policies are permission-string based: each `(action, resource)` pair maps
//! to at most one required permission. Pairs without a requirement only need
//! an authenticated subject.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SETTINGS_READ: &str = "settings:read";
pub const SETTINGS_WRITE: &str = "settings:write";
pub const USERS_WRITE: &str = "users:write";

pub const ACTION_READ: &str = "read";
pub const ACTION_WRITE: &str = "write";

pub const RESOURCE_SETTINGS: &str = "settings";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("action {action} denied for resource {resource}")]
    Denied { action: String, resource: String },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PolicyContext {
    pub subject: String,
    pub action: String,
    pub resource: String,
    pub permissions: Vec<String>,
}

impl PolicyContext {
    pub fn new(
        subject: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        permissions: &[String],
    ) -> Self {
        Self {
            subject: subject.into(),
            action: action.into(),
            resource: resource.into(),
            permissions: permissions.to_vec(),
        }
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct PolicyEngine;

impl PolicyEngine {
    /// Permission needed for `action` on `resource`, if any.
    pub fn required_permission(&self, action: &str, resource: &str) -> Option<&'static str> {
        match (resource, action) {
            (RESOURCE_SETTINGS, ACTION_READ) => Some(SETTINGS_READ),
            (RESOURCE_SETTINGS, _) => Some(SETTINGS_WRITE),
            (_, ACTION_READ) => None,
            _ => Some(USERS_WRITE),
        }
    }

    pub fn check(&self, ctx: &PolicyContext) -> Result<(), AuthzError> {
        let denied = || AuthzError::Denied {
            action: ctx.action.clone(),
            resource: ctx.resource.clone(),
        };
        if ctx.subject.is_empty() {
            return Err(denied());
        }
        match self.required_permission(&ctx.action, &ctx.resource) {
            Some(needed) if !ctx.permissions.iter().any(|p| p == needed) => Err(denied()),
            _ => Ok(()),
        }
    }
}
