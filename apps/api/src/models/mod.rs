pub mod catalog;
pub mod generation;
pub mod profile;
