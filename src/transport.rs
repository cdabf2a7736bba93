//! Mapping of transport-level failures into gateway errors.

// crates.io
use oauth2::HttpClientError;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::ResponseMetadata,
	obs::OperationKind,
};

/// Maps HTTP transport failures into gateway [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a gateway error.
	fn map_transport_error(
		&self,
		operation: OperationKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: OperationKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(operation, meta, *inner),
			other => map_generic_error(other),
		}
	}
}

/// Maps the transport-independent [`HttpClientError`] variants; custom mappers can delegate
/// here for everything but their own transport error.
pub fn map_generic_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		_ => TransportError::Other { message: "unrecognized HTTP client failure".into() }.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(
	operation: OperationKind,
	meta: Option<&ResponseMetadata>,
	err: ReqwestError,
) -> Error {
	// Operation reserved for future use.
	let _ = operation;

	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout {
			status: meta.and_then(|value| value.status).or_else(|| reqwest_status(&err)),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn reqwest_status(err: &ReqwestError) -> Option<u16> {
	err.status().map(|code| code.as_u16())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug)]
	struct Refused;
	impl Display for Refused {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("connection refused")
		}
	}
	impl StdError for Refused {}

	#[test]
	fn generic_mapping_covers_transport_variants() {
		let err = map_generic_error(HttpClientError::Reqwest(Box::new(Refused)));

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));

		let err = map_generic_error::<Refused>(HttpClientError::Other("socket closed".into()));

		assert!(matches!(err, Error::Transport(TransportError::Other { .. })));
		assert!(err.to_string().contains("socket closed"));

		let err = map_generic_error::<Refused>(HttpClientError::Io(std::io::Error::other("eof")));

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
