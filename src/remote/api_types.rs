//! Wire-level helpers for the PostgREST dialect.
//!
//! Kept apart from the client so request shapes and failure parsing can be
//! checked without a server.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::cache::Record;
use crate::error::RemoteError;
use crate::query::ListQuery;

use super::classify::is_table_missing;

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
  pub message: Option<String>,
  pub code: Option<String>,
  pub details: Option<String>,
  pub hint: Option<String>,
}

/// Human-readable message for a failed response.
pub fn failure_message(status: StatusCode, body: &str) -> String {
  match serde_json::from_str::<ApiErrorBody>(body) {
    Ok(ApiErrorBody {
      message: Some(message),
      code,
      details,
      hint,
    }) if !message.is_empty() => {
      tracing::debug!(%status, ?code, ?details, ?hint, "backend error body");
      message
    }
    _ => {
      let body = body.trim();
      if body.is_empty() {
        status.to_string()
      } else {
        format!("{}: {}", status, body)
      }
    }
  }
}

/// Turn a failure message into a typed error for `table`.
pub fn classify_failure(message: String, table: &str) -> RemoteError {
  if is_table_missing(Some(&message), table) {
    RemoteError::TableMissing {
      table: table.to_string(),
      message,
    }
  } else {
    RemoteError::Other { message }
  }
}

/// Equality filter on `id`
pub fn id_filter(id: &str) -> (String, String) {
  ("id".to_string(), format!("eq.{}", id))
}

/// Query parameters for a list call.
pub fn list_params<T: Record>(query: &ListQuery<T::Filter>) -> Vec<(String, String)> {
  let mut params = vec![("select".to_string(), "*".to_string())];
  for (column, value) in T::filter_params(&query.filter) {
    params.push((column.to_string(), format!("eq.{}", value)));
  }
  params.push(("order".to_string(), query.order.to_param()));
  if let Some(limit) = query.limit {
    params.push(("limit".to_string(), limit.to_string()));
  }
  params
}
