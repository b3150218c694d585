//! Output formatting for the demo binary.
//!
//! - [`terminal`] - allocation report with colors

mod terminal;

pub use terminal::{format_field, format_row, print_allocations, AllocationRow};
