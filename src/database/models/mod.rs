mod macros;

pub mod assignment;
pub mod attendance;
pub mod event;
pub mod patch;
pub mod team;
pub mod user;

// Re-export all models for easy importing
pub use assignment::*;
pub use attendance::*;
pub use event::*;
pub use patch::Patch;
pub use team::*;
pub use user::*;
