//! Library-level scenarios built from fixture modules.

pub mod dispatch_test;
pub mod fixtures;
