//! Upload a CSV or Excel file, clean it, pick columns, chart them and convert
//! the result to CSV or `.xlsx`.
//!
//! The [`session::Session`] is the entry point for a UI: it owns the
//! [`pipeline::Pipeline`] and answers one [`session::Action`] at a time.

pub mod chart;
pub mod color;
pub mod data;
pub mod export;
pub mod pipeline;
pub mod session;
pub mod settings;
