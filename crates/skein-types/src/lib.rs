//! Foundation types for Skein.
//!
//! Skein keeps per-user timelines of posts in a content-addressed merkle list.
//! This crate holds the pieces every other Skein crate agrees on.
//!
//! # Key Types
//!
//! - [`Address`] -- Content address of a stored block (BLAKE3 hash)
//! - [`ContentHasher`] -- Domain-separated hasher producing addresses
//! - [`Post`] -- An immutable timeline record ordered by `created_at`

pub mod address;
pub mod error;
pub mod hasher;
pub mod post;

pub use address::Address;
pub use error::TypeError;
pub use hasher::ContentHasher;
pub use post::Post;
