//! Utils Module
pub mod otel;
