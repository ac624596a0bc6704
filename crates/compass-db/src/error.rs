//! Document store error types
//!
//! This module provides a unified error type for all document store operations.

use thiserror::Error;

/// Result type for document store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for document store operations
#[derive(Debug, Error)]
pub enum StoreError {
	/// The store could not be reached or the connection was lost
	#[error("Connection error: {0}")]
	ConnectionError(String),

	/// Query/operation execution error
	#[error("Execution error: {0}")]
	ExecutionError(String),

	/// Serialization/deserialization error
	#[error("Serialization error: {0}")]
	SerializationError(String),

	/// Malformed filter, update or pipeline document
	#[error("Invalid operation: {0}")]
	InvalidOperation(String),

	/// Authentication error
	#[error("Authentication error: {0}")]
	AuthenticationError(String),

	/// Operator or stage not supported by this backend
	#[error("Unsupported feature: {0}")]
	UnsupportedFeature(String),
}

impl StoreError {
	/// Returns `true` when the failure is transport-level rather than caused by the request.
	pub fn is_connection_error(&self) -> bool {
		matches!(
			self,
			StoreError::ConnectionError(_) | StoreError::AuthenticationError(_)
		)
	}
}

// In bson v3.x, both ser::Error and de::Error are type aliases for bson::error::Error
impl From<bson::error::Error> for StoreError {
	fn from(err: bson::error::Error) -> Self {
		StoreError::SerializationError(err.to_string())
	}
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for StoreError {
	fn from(err: mongodb::error::Error) -> Self {
		use mongodb::error::ErrorKind;

		match *err.kind {
			ErrorKind::Authentication { .. } => StoreError::AuthenticationError(err.to_string()),
			ErrorKind::InvalidArgument { .. } => StoreError::InvalidOperation(err.to_string()),
			ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
				StoreError::ConnectionError(err.to_string())
			}
			_ => StoreError::ExecutionError(err.to_string()),
		}
	}
}
