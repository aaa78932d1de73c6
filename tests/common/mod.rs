pub mod given;
mod render_target;
mod test_context;

pub use frame_state::*;
pub use render_target::*;
pub use test_context::*;
