//! Landing page frame: header, title, screen body, footer.

use crate::core::labels::page;
use crate::view::Screen;

const RULE_WIDTH: usize = 56;

pub fn render_page(screen: &Screen) -> String {
    let rule = "═".repeat(RULE_WIDTH);
    let thin = "─".repeat(RULE_WIDTH);
    let mut out = String::new();
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("  {}\n", page::HEADER));
    out.push_str(&format!("  {}\n", page::TAGLINE));
    out.push_str(&format!("{}\n\n", rule));
    out.push_str(&format!("{}\n\n", page::TITLE));
    out.push_str(&screen.to_text());
    out.push_str(&format!("\n{}\n", thin));
    out.push_str(&format!("{:^width$}\n", page::FOOTER, width = RULE_WIDTH));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_wraps_body() {
        let rendered = render_page(&Screen::SignIn);
        let header = rendered.find("Welcome to DeFi Card").unwrap();
        let body = rendered.find("Sign in to create").unwrap();
        let footer = rendered.find("2025 DeFi Card").unwrap();
        assert!(header < body && body < footer);
    }
}
