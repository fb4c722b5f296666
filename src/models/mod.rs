pub mod candidate;
pub mod context;
pub mod event;
pub mod lineup;

pub use candidate::*;
pub use context::*;
pub use event::*;
pub use lineup::*;
