//! Runtime context available to macros and system-variable assembly.

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::vars::VariableMap;

/// The user a response is being written for or by.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InquiryRef {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResponseRef {
    pub id: String,
    pub content: String,
}

/// Per-render bundle of optional entities and caller-supplied maps.
///
/// `now` is the render clock. Both the `current_*` system variables and the
/// `now`/`date` macros read it so one render sees a single instant.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MacroContext {
    pub user: Option<UserRef>,
    pub inquiry: Option<InquiryRef>,
    pub response: Option<ResponseRef>,
    pub custom_variables: VariableMap,
    pub system_variables: VariableMap,
    #[serde(skip, default = "Local::now")]
    pub now: DateTime<Local>,
}

impl Default for MacroContext {
    fn default() -> Self {
        Self {
            user: None,
            inquiry: None,
            response: None,
            custom_variables: VariableMap::new(),
            system_variables: VariableMap::new(),
            now: Local::now(),
        }
    }
}

impl MacroContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(mut self, user: UserRef) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn with_inquiry(mut self, inquiry: InquiryRef) -> Self {
        self.inquiry = Some(inquiry);
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: ResponseRef) -> Self {
        self.response = Some(response);
        self
    }

    #[must_use]
    pub fn with_custom_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.custom_variables.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_system_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.system_variables.insert(key.into(), value.into());
        self
    }

    /// Pin the render clock.
    #[must_use]
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }
}
