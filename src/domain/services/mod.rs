pub mod actions;
mod app_state;
mod bubble;
mod bubble_list;
mod chat;
pub mod events;
mod scroll;
mod sessions;
mod view;

pub use app_state::*;
pub use bubble::*;
pub use bubble_list::*;
pub use chat::*;
pub use scroll::*;
pub use sessions::*;
pub use view::*;
