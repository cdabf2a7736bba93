//! Service descriptors (configuration data) for the platform the gateway talks to.
//!
//! `descriptor` exposes validated metadata ([`ServiceDescriptor`]) covering the authorization,
//! API, and refresh endpoints, the client identity, requested scopes, and dispatch pacing.
//! `builder` assembles and validates descriptors.

/// Builder API for assembling service descriptors.
pub mod builder;
pub mod descriptor;

pub use builder::*;
pub use descriptor::*;
