//! Built-in data sources that do not come from the CSV tree.

pub mod sample;
