pub mod clipboard;
pub mod hotkey;

pub use clipboard::SystemClipboard;
pub use hotkey::HotkeyManager;
