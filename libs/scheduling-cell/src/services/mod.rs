pub mod availability;
pub mod resolver;
pub mod rules;
pub mod snapshot;
pub mod suggestions;
pub mod timeslot;
