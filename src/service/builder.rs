// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, ScopeValidationError},
	service::{ServiceDescriptor, ServiceEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ServiceDescriptorError {
	/// Client identifier is required for the authorization redirect.
	#[error("Client identifier cannot be empty.")]
	MissingClientId,
	/// Authorization endpoint is mandatory.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// API base URL is mandatory.
	#[error("Missing API base URL.")]
	MissingApiBase,
	/// Refresh endpoint is mandatory.
	#[error("Missing refresh endpoint.")]
	MissingRefreshEndpoint,
	/// Redirect URI is mandatory.
	#[error("Missing redirect URI.")]
	MissingRedirectUri,
	/// The authorization endpoint must use HTTPS.
	#[error("The authorization endpoint must use HTTPS: {url}.")]
	InsecureAuthorizationEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint is not an HTTP(S) URL.
	#[error("The {endpoint} endpoint must be an HTTP(S) URL: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A preset endpoint could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidUrl {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Requested scopes are invalid.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] ScopeValidationError),
	/// Dispatch spacing must be positive.
	#[error("Dispatch interval must be greater than zero.")]
	ZeroDispatchInterval,
}

/// Builder for [`ServiceDescriptor`] values.
#[derive(Debug)]
pub struct ServiceDescriptorBuilder {
	/// Client identifier for the descriptor being constructed.
	pub client_id: String,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// API base URL.
	pub api_base: Option<Url>,
	/// Refresh endpoint of the companion backend.
	pub refresh_endpoint: Option<Url>,
	/// Redirect URI registered with the platform.
	pub redirect_uri: Option<Url>,
	/// Requested scopes.
	pub scope: ScopeSet,
	/// Minimum spacing between two dispatches.
	pub dispatch_interval: StdDuration,
	/// Forces the consent dialog on every redirect.
	pub show_dialog: bool,
}
impl ServiceDescriptorBuilder {
	/// Creates a new builder seeded with the provided client identifier.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			authorization_endpoint: None,
			api_base: None,
			refresh_endpoint: None,
			redirect_uri: None,
			scope: ScopeSet::default(),
			dispatch_interval: ServiceDescriptor::DEFAULT_DISPATCH_INTERVAL,
			show_dialog: false,
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Sets the refresh endpoint.
	pub fn refresh_endpoint(mut self, url: Url) -> Self {
		self.refresh_endpoint = Some(url);

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Overrides the requested scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Overrides the dispatch spacing (defaults to one second).
	pub fn dispatch_interval(mut self, interval: StdDuration) -> Self {
		self.dispatch_interval = interval;

		self
	}

	/// Forces the consent dialog on every authorization redirect.
	pub fn show_dialog(mut self, show_dialog: bool) -> Self {
		self.show_dialog = show_dialog;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ServiceDescriptor, ServiceDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ServiceDescriptorError::MissingAuthorizationEndpoint)?;
		let api = self.api_base.ok_or(ServiceDescriptorError::MissingApiBase)?;
		let refresh = self.refresh_endpoint.ok_or(ServiceDescriptorError::MissingRefreshEndpoint)?;
		let redirect_uri = self.redirect_uri.ok_or(ServiceDescriptorError::MissingRedirectUri)?;
		let descriptor = ServiceDescriptor {
			client_id: self.client_id,
			endpoints: ServiceEndpoints { authorization, api: with_trailing_slash(api), refresh },
			redirect_uri,
			scope: self.scope,
			dispatch_interval: self.dispatch_interval,
			show_dialog: self.show_dialog,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ServiceDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ServiceDescriptorError> {
		if self.client_id.trim().is_empty() {
			return Err(ServiceDescriptorError::MissingClientId);
		}
		if self.endpoints.authorization.scheme() != "https" {
			return Err(ServiceDescriptorError::InsecureAuthorizationEndpoint {
				url: self.endpoints.authorization.to_string(),
			});
		}
		if self.dispatch_interval.is_zero() {
			return Err(ServiceDescriptorError::ZeroDispatchInterval);
		}

		validate_http("api", &self.endpoints.api)?;
		validate_http("refresh", &self.endpoints.refresh)?;
		validate_http("redirect", &self.redirect_uri)?;

		Ok(())
	}
}

fn validate_http(name: &'static str, url: &Url) -> Result<(), ServiceDescriptorError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ServiceDescriptorError::UnsupportedScheme { endpoint: name, url: url.to_string() }),
	}
}

// `Url::join` drops the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}
