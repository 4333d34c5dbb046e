//! Wire types shared by the client and its callers.

use serde::{Deserialize, Serialize};

/// Error body returned by the hosted backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub code: String,
    pub message: String,
}

/// Authenticated session state cached by the client. The auth layer sets
/// it after sign-in/refresh; the offline core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

/// Row filter for `select_where`, rendered as query-string operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFilter {
    /// `column = value`
    Eq(String, String),
    /// `column IN (values)`
    In(String, Vec<String>),
}

impl RemoteFilter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn any_of(column: impl Into<String>, values: Vec<String>) -> Self {
        Self::In(column.into(), values)
    }

    /// Render as a (column, operator-expression) query pair.
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            RemoteFilter::Eq(column, value) => (column.clone(), format!("eq.{}", value)),
            RemoteFilter::In(column, values) => {
                (column.clone(), format!("in.({})", values.join(",")))
            }
        }
    }
}
