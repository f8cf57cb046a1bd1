//! Core data types for the uniques collector

pub mod client_id;
pub mod day;
