//! # Persistence Adapter
//!
//! Bridges the in-memory [`crate::model::ContentStore`] to durable storage and
//! to the generated static mirror:
//!
//! - [`content`]: load the store (content file, embedded page snapshot, or
//!   seed fallback) and save it as pretty-printed JSON.
//! - [`mirror`]: turn the site's template document into one standalone
//!   `<id>.html` page per post, each carrying a snapshot of the whole store.
//! - [`sitemap`]: the `sitemap.xml` listing the site root and every post.
//! - [`images`]: copy a picked image into the images directory under a
//!   collision-resistant name.
//!
//! Every function takes the [`crate::store::StorageBackend`] and the granted
//! locations explicitly; none of them asks the user for anything.

pub mod content;
pub mod images;
pub mod mirror;
pub mod sitemap;
