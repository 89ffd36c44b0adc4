//! Request socket shared by the input helper, the renderer and scripts.
//!
//! The [`listener`] turns newline-delimited JSON into
//! [`Request`](crate::traits::Request)s; the [`tap`] module builds the
//! keyboard and mouse [`EventTap`](crate::traits::EventTap) on top of it.

pub mod listener;
pub mod tap;
