//! Core domain types shared by storage, the interaction loop and the surfaces.

pub mod retention;
pub mod turn;

pub use retention::RetentionPolicy;
pub use turn::{Turn, TIMESTAMP_FORMAT};
