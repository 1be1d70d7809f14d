//! CSV export of estimate results.

pub mod export;
