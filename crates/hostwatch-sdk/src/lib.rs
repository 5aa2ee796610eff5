//! # hostwatch SDK
//!
//! Lists the virtual-machine instances running on a hypervisor host by
//! talking to an OpenStack-style control plane.
//!
//! The SDK provides:
//!
//! * [`InstanceLister`] — authenticates against the identity endpoint,
//!   caches the token, and lists a host's instances with bounded
//!   re-authentication on rejected tokens.
//! * [`Session`] — the injectable credential cache a lister works with.
//! * [`ListerConfig`] — endpoints, admin credentials, target host and
//!   request policy, usually read from the environment.
//! * [`ComputeEndpoints`] — canonical compute API URL construction.
//! * [`SdkError`] — unified error type.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use hostwatch_sdk::{InstanceLister, ListerConfig};
//!
//! # async fn run() -> Result<(), hostwatch_sdk::SdkError> {
//! let lister = InstanceLister::new(ListerConfig::from_env())?;
//! for server in lister.list_target_host().await {
//!     println!("{:?} {:?}", server.id(), server.status());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod session;

pub use client::InstanceLister;
pub use config::ListerConfig;
pub use endpoints::ComputeEndpoints;
pub use error::SdkError;
pub use session::Session;

// Re-export the model types that appear in the public API.
pub use hostwatch_models::{Credential, HostId, ServerRecord};
