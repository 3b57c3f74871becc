//! HTTP request handlers.

/// Field deletion endpoints.
pub mod fields;
/// Grid page endpoint.
pub mod grid;
/// Post and post-type seeding endpoints.
pub mod posts;
/// Token issuance and batched save endpoints.
pub mod save;
