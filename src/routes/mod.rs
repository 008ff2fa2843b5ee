/// Router Module Index
///
/// Routes are grouped by who may call them. Access control is applied per group
/// in `create_router`, never inside individual handlers.

/// Read-only site content and the contact form. No authentication.
pub mod public;

/// Sign-in, sign-out and identity endpoints under `/api/auth`.
pub mod auth;

/// Dashboard API under `/api/admin`. Every route requires an admin identity.
pub mod admin;
