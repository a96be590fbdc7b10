//! Terminal plotting.

pub mod ascii;
