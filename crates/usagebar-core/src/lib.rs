//! Core library for usagebar: polls the usage script, caches the last good
//! reading, and projects it into display values.

pub mod usage;
