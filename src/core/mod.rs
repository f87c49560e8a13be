//! Shared building blocks: observable state cells and UI text constants.

pub mod labels;
pub mod signal;

pub use signal::Signal;
