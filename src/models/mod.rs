//! Model identifiers.

pub mod google;

pub use google::GoogleModel;
