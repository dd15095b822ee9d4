//! OAuth2 access-token handling for gcl.
//!
//! The authorization-code dance happens once, out of band; this crate only
//! deals with what the sync engine needs at runtime: a cached bearer token
//! and the refresh grant that replaces it when the object store starts
//! answering 401.

pub mod error;
pub mod supplier;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use supplier::{OauthSupplier, TokenSupplier};
pub use token::AccessToken;
