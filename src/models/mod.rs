// Data models for the analysis core

pub mod angles;
pub mod evaluation;
pub mod gait;
pub mod landmark;
pub mod phase;
pub mod snapshot;
pub mod stride;
pub mod trajectory;

pub use angles::*;
pub use evaluation::*;
pub use gait::*;
pub use landmark::*;
pub use phase::*;
pub use snapshot::*;
pub use stride::*;
pub use trajectory::*;
