//! Data models for posts, grid pages, and field values.

/// Grid page models returned by the grid builder.
pub mod grid;
/// Post, post-type, and stored-meta models.
pub mod post;
/// The scalar/list field value union.
pub mod value;
