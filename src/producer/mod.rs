//! Producer-side content that does not depend on the oracle: canonical
//! fallback segments, the sponsored market segment, and episode scoring.

pub mod fallback;
pub mod scoring;
pub mod sponsored;

pub use fallback::*;
pub use scoring::*;
pub use sponsored::*;
