//! Scheduling availability and conflict-resolution engine.
//!
//! Decides whether a therapist can be booked for a given date/time/duration,
//! enumerates every reason a slot is or is not usable, proposes nearby
//! alternatives, and can pick a replacement slot automatically. The engine is
//! stateless: each evaluation reads one day snapshot from the store and does
//! pure computation over it.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
