//! Store queries for names, countries and name-country probabilities
//!
//! Every write is a single statement keyed by a unique constraint, so
//! concurrent requests resolve through the database rather than locks.

pub mod countries;
pub mod names;
pub mod predictions;
