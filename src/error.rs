//! Gateway-level error types shared across dispatch, refresh, stores, and collaborators.

// self
use crate::{_prelude::*, auth::CallbackError};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Authorization redirect could not be turned into credentials.
	#[error(transparent)]
	Callback(#[from] CallbackError),

	/// No usable credential exists; the caller must send the user through authorization again.
	#[error("Session expired. Please log in again: {reason}.")]
	Unauthenticated {
		/// Why the session could not be (re)established.
		reason: String,
	},
	/// Upstream answered with a non-success status after at most one retry.
	#[error("{message}")]
	RequestFailed {
		/// HTTP status code returned by the API.
		status: u16,
		/// Upstream message, or a generic status message when the body carried none.
		message: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// A body expected to be JSON could not be decoded.
	#[error("Response body is not the expected JSON.")]
	MalformedResponse {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response, when available.
		status: Option<u16>,
	},
}
impl Error {
	/// Builds an [`Error::Unauthenticated`] with the provided reason.
	pub fn unauthenticated(reason: impl Into<String>) -> Self {
		Self::Unauthenticated { reason: reason.into() }
	}

	/// Returns the HTTP status attached to the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::RequestFailed { status, .. } => Some(*status),
			Self::MalformedResponse { status, .. } => *status,
			_ => None,
		}
	}

	/// Returns `true` when the caller has to restart the authorization redirect.
	pub fn requires_reauthorization(&self) -> bool {
		matches!(self, Self::Unauthenticated { .. } | Self::Callback(_))
	}
}

/// Configuration and request-construction failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A request path could not be joined onto the API base URL.
	#[error("Request path `{path}` cannot be joined onto the API base URL.")]
	InvalidPath {
		/// Path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request body could not be serialized to JSON.
	#[error("Request body cannot be serialized to JSON.")]
	BodySerialization(#[source] serde_json::Error),
	/// Service descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::service::ServiceDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request timed out before a response arrived.
	#[error("Request timed out while calling the API.")]
	Timeout {
		/// HTTP status code, when the transport captured one.
		status: Option<u16>,
	},
	/// HTTP client reported a failure without a typed source.
	#[error("HTTP client error occurred while calling the API: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
