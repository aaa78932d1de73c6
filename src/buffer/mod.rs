mod camera;
mod half2;
mod indirect_args;
mod set;
mod settings;
mod sort;
mod splat;
mod wrapper;

pub use camera::*;
pub use half2::*;
pub use indirect_args::*;
pub use set::*;
pub use settings::*;
pub use sort::*;
pub use splat::*;
pub use wrapper::*;
