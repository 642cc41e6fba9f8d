pub mod controller;
pub mod events;

pub use controller::{ModelSet, SessionController};
pub use events::SessionEvent;
