use crate::dispatch::ClipboardSink;
use anyhow::Context;
use windows::Win32::Foundation::{HANDLE, HWND};
use windows::Win32::System::DataExchange::{
    CloseClipboard, EmptyClipboard, OpenClipboard, SetClipboardData,
};
use windows::Win32::System::Memory::{GlobalAlloc, GlobalFree, GlobalLock, GlobalUnlock, GMEM_MOVEABLE};
use windows::Win32::System::Ole::CF_UNICODETEXT;

/// Writes text to the Windows clipboard as CF_UNICODETEXT.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsClipboard;

impl ClipboardSink for WindowsClipboard {
    fn set_text(&self, text: &str) -> anyhow::Result<()> {
        let wide: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
        let bytes = wide.len() * std::mem::size_of::<u16>();

        unsafe {
            OpenClipboard(HWND::default()).context("OpenClipboard")?;
            let result = (|| -> anyhow::Result<()> {
                EmptyClipboard().context("EmptyClipboard")?;

                let hmem = GlobalAlloc(GMEM_MOVEABLE, bytes).context("GlobalAlloc")?;
                let dst = GlobalLock(hmem) as *mut u16;
                if dst.is_null() {
                    let _ = GlobalFree(hmem);
                    anyhow::bail!("GlobalLock failed");
                }
                std::ptr::copy_nonoverlapping(wide.as_ptr(), dst, wide.len());
                let _ = GlobalUnlock(hmem);

                // On success the clipboard owns the allocation.
                if let Err(e) = SetClipboardData(CF_UNICODETEXT.0 as u32, HANDLE(hmem.0 as isize)) {
                    let _ = GlobalFree(hmem);
                    return Err(e).context("SetClipboardData");
                }
                Ok(())
            })();
            let _ = CloseClipboard();
            result
        }
    }
}
