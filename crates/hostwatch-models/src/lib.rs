#![deny(missing_docs)]

//! # hostwatch models
//!
//! Data types exchanged with an OpenStack-style control plane when
//! listing the instances running on a hypervisor.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ids`] | `TenantId`, `HostId`, `AuthToken` |
//! | [`credential`] | `Credential` (token + tenant, optional expiry) |
//! | [`identity`] | Token request/response payloads |
//! | [`server`] | `ServerRecord`, `ServerList` |
//! | [`error`] | `ModelError` |

pub mod credential;
pub mod error;
#[allow(missing_docs)]
pub mod identity;
pub mod ids;
#[allow(missing_docs)]
pub mod server;

pub use credential::*;
pub use error::*;
pub use identity::*;
pub use ids::*;
pub use server::*;
