//! Request middleware shared by every route.
//!
//! Session resolution lives with the HTTP adapter because it depends on the
//! authentication port; only transport-agnostic concerns live here.

pub mod trace;

pub use trace::Trace;
