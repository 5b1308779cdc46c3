//! HTTP middleware.

pub mod inject;
