pub mod benchmark;
pub mod predict;
