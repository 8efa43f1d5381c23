// Main library entry point for stackfigure.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
