//! Helper functions shared by the generator, server and templates

mod date;

pub use date::*;
