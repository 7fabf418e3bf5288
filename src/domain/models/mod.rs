mod action;
mod backend;
mod event;
mod loading;
mod message;
mod role;
mod textarea;
mod thread;

pub use action::*;
pub use backend::*;
pub use event::*;
pub use loading::*;
pub use message::*;
pub use role::*;
pub use textarea::*;
pub use thread::*;
