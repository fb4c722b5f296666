pub mod stage0_classify;
pub mod stage1_propose;
pub mod stage2_allocate;
pub mod stage3_render;

pub use stage0_classify::*;
pub use stage1_propose::*;
pub use stage2_allocate::*;
pub use stage3_render::*;
