//! Request extractors shared by handlers.
//!
//! - [`session::SessionId`] -- Identifies the browser session that owns a
//!   reservation.

pub mod session;
