use crate::providers::Printer;

/// Hands the page to the browser's print dialog. The document argument is
/// ignored: the browser prints what is rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowPrinter;

impl Printer for WindowPrinter {
    fn print(&self, _document: &str) {
        let Some(window) = web_sys::window() else {
            super::log!("[DefiCard] no window, print skipped");
            return;
        };
        if let Err(e) = window.print() {
            super::log!("[DefiCard] print failed: {:?}", e);
        }
    }
}
