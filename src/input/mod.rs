#[cfg(all(target_os = "linux", feature = "buttons"))]
mod handler;
mod keyboard;
mod long_press;
mod types;

#[cfg(all(target_os = "linux", feature = "buttons"))]
pub use handler::ButtonInputHandler;
pub use keyboard::KeyboardInputHandler;
pub use long_press::LongPressTracker;
pub use types::{ButtonAction, ButtonEvent, ButtonKey, KeyMap};
