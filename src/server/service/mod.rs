//! Domain operations behind the HTTP handlers.
//!
//! Each service owns the repositories it needs and returns `ApiError` so the
//! handlers can pass results straight through.

pub(crate) mod auth;
pub(crate) mod availability;
pub(crate) mod billing;
pub(crate) mod bookings;
pub(crate) mod guests;
pub(crate) mod housekeeping;
pub(crate) mod inventory;
pub(crate) mod loyalty;
pub(crate) mod reports;
pub(crate) mod restaurant;
pub(crate) mod rooms;
pub(crate) mod staff;
pub(crate) mod theme;
