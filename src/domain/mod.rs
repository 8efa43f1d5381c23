pub mod frame;
pub mod graph;
pub mod palette;
