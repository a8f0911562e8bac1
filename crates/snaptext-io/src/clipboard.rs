use anyhow::Context;
use arboard::Clipboard;
use snaptext_core::pipeline::ClipboardSink;

/// System clipboard, opened on first use and kept for the process lifetime
/// so X11 selections stay owned after a write.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::warn!("Clipboard unavailable at startup, will retry on use: {e}");
                None
            }
        };
        Self { inner }
    }

    fn clipboard(&mut self) -> anyhow::Result<&mut Clipboard> {
        if self.inner.is_none() {
            self.inner = Some(Clipboard::new().context("Failed to open clipboard")?);
        }
        self.inner.as_mut().context("Clipboard not initialized")
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.clipboard()?
            .set_text(text)
            .context("Failed to write clipboard")?;
        tracing::debug!("Copied {} chars to clipboard", text.len());
        Ok(())
    }
}
