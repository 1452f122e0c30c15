//! Error classification helpers for the commitsum CLI.

use anyhow::Error;

use crate::ollama::BackendError;

/// Checks whether an error chain contains a failure to reach the backend at
/// all, as opposed to a bad response from it.
///
/// # Examples
///
/// ```
/// use anyhow::anyhow;
/// use commitsum::error::is_connection_error;
///
/// let error = anyhow!("unexpected status code: 500");
/// assert!(!is_connection_error(&error));
/// ```
pub fn is_connection_error(error: &Error) -> bool {
  error.chain().any(|cause| {
    match cause.downcast_ref::<BackendError>() {
      Some(BackendError::Transport(e)) => e.is_connect() || e.is_timeout(),
      _ => false
    }
  })
}

#[cfg(test)]
mod tests {
  use anyhow::anyhow;
  use reqwest::StatusCode;

  use super::*;

  #[test]
  fn test_status_error_is_not_connection_error() {
    let error = Error::new(BackendError::Status(StatusCode::INTERNAL_SERVER_ERROR)).context("Error generating commit message");
    assert!(!is_connection_error(&error));
  }

  #[test]
  fn test_empty_response_is_not_connection_error() {
    assert!(!is_connection_error(&Error::new(BackendError::EmptyResponse)));
  }

  #[test]
  fn test_plain_error_is_not_connection_error() {
    assert!(!is_connection_error(&anyhow!("File not found")));
  }
}
