//! Outbound request and inbound response values that flow through the gateway.

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
		header::{AUTHORIZATION, CONTENT_TYPE},
	},
};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError, http};

/// One logical outbound API call.
///
/// Defaults to a `GET` with no body. Caller-supplied headers are preserved when the gateway
/// injects the bearer credential; an `Authorization` header set here is replaced.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Fully qualified target, query included.
	pub url: Url,
	/// Caller-supplied headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request with an explicit method.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Creates a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Creates a `POST` request.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Creates a `PUT` request.
	pub fn put(url: Url) -> Self {
		Self::new(Method::PUT, url)
	}

	/// Creates a `DELETE` request.
	pub fn delete(url: Url) -> Self {
		Self::new(Method::DELETE, url)
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets a raw body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `payload` as the JSON body and sets `Content-Type: application/json`.
	pub fn with_json<T>(mut self, payload: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(payload).map_err(ConfigError::BodySerialization)?;

		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self.body = Some(body);

		Ok(self)
	}

	/// Builds the wire request carrying `access` as the bearer credential.
	pub fn to_http(&self, access: &TokenSecret) -> Result<HttpRequest> {
		let bearer = HeaderValue::try_from(access.bearer())
			.map_err(|e| ConfigError::HttpRequest(e.into()))?;

		self.build_http(Some(bearer))
	}

	/// Builds the wire request without any credential, e.g. for the refresh endpoint.
	pub(crate) fn to_anonymous_http(&self) -> Result<HttpRequest> {
		self.build_http(None)
	}

	fn build_http(&self, bearer: Option<HeaderValue>) -> Result<HttpRequest> {
		let mut headers = self.headers.clone();

		match bearer {
			Some(value) => {
				headers.insert(AUTHORIZATION, value);
			},
			None => {
				headers.remove(AUTHORIZATION);
			},
		}

		let mut request = HttpRequest::new(self.body.clone().unwrap_or_default());

		*request.method_mut() = self.method.clone();
		*request.uri_mut() =
			self.url.as_str().parse().map_err(|e: oauth2::http::uri::InvalidUri| {
				ConfigError::HttpRequest(e.into())
			})?;
		*request.headers_mut() = headers;

		Ok(request)
	}
}

/// Raw successful response handed back to collaborators for decoding.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Vec<u8>,
}
impl ApiResponse {
	/// Wraps a wire response.
	pub fn from_http(response: HttpResponse) -> Self {
		let status = response.status();
		let headers = response.headers().clone();

		Self { status, headers, body: response.into_body() }
	}

	/// HTTP status code.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Raw body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Consumes the response and returns the body bytes.
	pub fn into_body(self) -> Vec<u8> {
		self.body
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		decode_json(&self.body, Some(self.status.as_u16()))
	}

	/// Converts a non-success response into [`Error::RequestFailed`].
	pub(crate) fn into_failure(self) -> Error {
		let status = self.status.as_u16();
		let message = ApiErrorBody::message_from(&self.body)
			.unwrap_or_else(|| format!("HTTP error, status {status}"));
		let retry_after = http::parse_retry_after(&self.headers);

		Error::RequestFailed { status, message, retry_after }
	}
}

/// Error payload shapes the platform and its companion backend return.
///
/// Web API errors carry `{"error": {"status": 404, "message": "..."}}`; authorization-server
/// style errors carry `{"error": "invalid_grant", "error_description": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
	/// Nested error object or bare error code.
	pub error: Option<ApiErrorDetail>,
	/// Human-readable description accompanying a bare error code.
	pub error_description: Option<String>,
}
impl ApiErrorBody {
	/// Extracts the most descriptive message from a raw error body.
	pub fn message_from(body: &[u8]) -> Option<String> {
		let parsed: Self = serde_json::from_slice(body).ok()?;

		parsed.message()
	}

	/// Most descriptive message carried by the payload.
	pub fn message(&self) -> Option<String> {
		match &self.error {
			Some(ApiErrorDetail::Object { message: Some(message), .. }) if !message.is_empty() =>
				Some(message.clone()),
			Some(ApiErrorDetail::Code(code)) => Some(
				self.error_description.clone().filter(|d| !d.is_empty()).unwrap_or_else(|| code.clone()),
			),
			_ => self.error_description.clone().filter(|d| !d.is_empty()),
		}
	}
}

/// The `error` member of an [`ApiErrorBody`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorDetail {
	/// Web API error object.
	Object {
		/// Status echoed in the body.
		status: Option<u16>,
		/// Upstream message.
		message: Option<String>,
	},
	/// Bare error code.
	Code(String),
}

/// Decodes JSON with path-aware errors mapped into [`Error::MalformedResponse`].
pub(crate) fn decode_json<T>(body: &[u8], status: Option<u16>) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| Error::MalformedResponse { source, status })
}
