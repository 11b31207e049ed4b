pub mod dive;
pub mod meta;
pub mod sample;

pub use dive::*;
pub use meta::*;
pub use sample::*;
