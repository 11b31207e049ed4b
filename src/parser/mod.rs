pub mod event;
pub mod main;
pub mod meta;
pub mod reconstruct;
pub mod store;

pub use event::*;
pub use main::*;
pub use meta::*;
pub use reconstruct::*;
pub use store::*;
