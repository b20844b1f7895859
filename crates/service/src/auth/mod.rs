//! Auth module: three-layer architecture (domain, repository, service) plus the role gate.
//!
//! Token issuing and validation live in [`service::AuthService`]; the checks a
//! handler applies to an authenticated [`domain::Principal`] live in [`gate`].

pub mod domain;
pub mod errors;
pub mod gate;
pub mod repository;
pub mod service;

pub use domain::{Principal, Role};
pub use errors::AuthError;
pub use service::AuthService;
