use anyhow::{Context, Result};
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};

/// Global shortcut that starts a selection from anywhere.
///
/// Must be created on the thread running the UI event loop, which pumps
/// the platform messages the hotkey arrives on.
pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

impl HotkeyManager {
    /// Create a new hotkey manager with Ctrl+Shift+S
    pub fn new() -> Result<Self> {
        Self::with_hotkey(Modifiers::CONTROL | Modifiers::SHIFT, Code::KeyS)
    }

    pub fn with_hotkey(modifiers: Modifiers, code: Code) -> Result<Self> {
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;

        let hotkey = HotKey::new(Some(modifiers), code);

        manager
            .register(hotkey)
            .context("Failed to register hotkey")?;

        Ok(Self { manager, hotkey })
    }

    /// Drains pending hotkey events; true if ours was pressed (non-blocking)
    pub fn poll(&self) -> bool {
        let receiver = GlobalHotKeyEvent::receiver();
        let mut pressed = false;
        while let Ok(event) = receiver.try_recv() {
            if event.id == self.hotkey.id() && event.state == HotKeyState::Pressed {
                tracing::debug!("Hotkey pressed: {:?}", event.id);
                pressed = true;
            }
        }
        pressed
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        let _ = self.manager.unregister(self.hotkey);
    }
}
