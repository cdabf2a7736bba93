//! Credential secrets, scope sets, the credential lifecycle, and the authorization redirect.

pub mod authorize;
pub mod callback;
pub mod credentials;
pub mod scope;
pub mod secret;

pub use authorize::*;
pub use callback::*;
pub use credentials::*;
pub use scope::*;
pub use secret::*;
