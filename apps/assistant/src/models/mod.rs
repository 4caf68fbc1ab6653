pub mod application;
pub mod generation;
