//! Service descriptor data structures shared by the gateway and collaborators.

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	error::ConfigError,
	service::{ServiceDescriptorBuilder, ServiceDescriptorError},
};

/// Public authorization endpoint of the default platform.
pub const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
/// Public Web API base URL of the default platform.
pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/";
/// Scopes the playlist and statistics helpers need.
pub const SPOTIFY_DEFAULT_SCOPES: [&str; 6] = [
	"user-top-read",
	"playlist-read-private",
	"playlist-modify-private",
	"playlist-modify-public",
	"user-read-email",
	"user-read-private",
];

/// Endpoint set declared by a service descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
	/// Authorization endpoint the user agent is redirected to.
	pub authorization: Url,
	/// Base URL that relative API paths are joined onto.
	pub api: Url,
	/// Companion backend endpoint that trades a refresh credential for an access credential.
	pub refresh: Url,
}

/// Immutable service descriptor consumed by the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
	/// Public client identifier registered with the platform.
	pub client_id: String,
	/// Endpoint definitions.
	pub endpoints: ServiceEndpoints,
	/// Redirect URI registered for the implicit grant.
	pub redirect_uri: Url,
	/// Scopes requested during authorization.
	pub scope: ScopeSet,
	/// Minimum spacing between two dispatches.
	pub dispatch_interval: StdDuration,
	/// Forces the consent dialog on every authorization redirect.
	pub show_dialog: bool,
}
impl ServiceDescriptor {
	/// Spacing applied when the builder is not told otherwise.
	pub const DEFAULT_DISPATCH_INTERVAL: StdDuration = StdDuration::from_millis(1_000);

	/// Creates a new builder for the provided client identifier.
	pub fn builder(client_id: impl Into<String>) -> ServiceDescriptorBuilder {
		ServiceDescriptorBuilder::new(client_id)
	}

	/// Descriptor preset for the default platform's public endpoints and scopes.
	pub fn spotify(
		client_id: impl Into<String>,
		redirect_uri: Url,
		refresh_endpoint: Url,
	) -> Result<Self, ServiceDescriptorError> {
		let authorization = Url::parse(SPOTIFY_AUTHORIZE_URL)
			.map_err(|source| ServiceDescriptorError::InvalidUrl { endpoint: "authorization", source })?;
		let api = Url::parse(SPOTIFY_API_BASE_URL)
			.map_err(|source| ServiceDescriptorError::InvalidUrl { endpoint: "api", source })?;
		let scope = ScopeSet::new(SPOTIFY_DEFAULT_SCOPES)?;

		Self::builder(client_id)
			.authorization_endpoint(authorization)
			.api_base(api)
			.refresh_endpoint(refresh_endpoint)
			.redirect_uri(redirect_uri)
			.scope(scope)
			.build()
	}

	/// Resolves an API path (optionally carrying a query) against the API base URL.
	pub fn api_url(&self, path: &str) -> Result<Url> {
		self.endpoints.api.join(path.trim_start_matches('/')).map_err(|source| {
			ConfigError::InvalidPath { path: path.to_owned(), source }.into()
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	#[test]
	fn spotify_preset_uses_public_endpoints() {
		let descriptor = ServiceDescriptor::spotify(
			"client",
			url("http://localhost:5500/main.html"),
			url("http://localhost:5500/refresh_token"),
		)
		.expect("Preset descriptor should build.");

		assert_eq!(descriptor.endpoints.authorization.as_str(), SPOTIFY_AUTHORIZE_URL);
		assert_eq!(descriptor.scope.len(), SPOTIFY_DEFAULT_SCOPES.len());
		assert_eq!(descriptor.dispatch_interval, ServiceDescriptor::DEFAULT_DISPATCH_INTERVAL);
		assert!(!descriptor.show_dialog);
	}

	#[test]
	fn api_url_joins_relative_paths_and_queries() {
		let descriptor = ServiceDescriptor::spotify(
			"client",
			url("http://localhost:5500/main.html"),
			url("http://localhost:5500/refresh_token"),
		)
		.expect("Preset descriptor should build.");
		let joined = descriptor
			.api_url("/v1/me/top/artists?limit=50")
			.expect("Relative path should join onto the API base.");

		assert_eq!(joined.as_str(), "https://api.spotify.com/v1/me/top/artists?limit=50");
	}
}
