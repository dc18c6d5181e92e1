use agentflow_core::NodeRole;
use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(15, 15, 26);
pub const SURFACE: Color = Color::Rgb(30, 30, 47);
pub const ACCENT: Color = Color::Rgb(0, 255, 247);
pub const TEXT: Color = Color::Rgb(237, 237, 237);
pub const MUTED: Color = Color::Rgb(102, 102, 102);
pub const OUTPUT: Color = Color::Rgb(170, 170, 170);
pub const WARN: Color = Color::Rgb(250, 189, 47);
pub const CRITICAL: Color = Color::Rgb(254, 128, 25);

pub const TITLE_STYLE: Style = Style::new().fg(ACCENT).add_modifier(Modifier::BOLD);
pub const SENDER_STYLE: Style = Style::new().fg(ACCENT).add_modifier(Modifier::BOLD);
pub const BODY_STYLE: Style = Style::new().fg(TEXT);
pub const HINT_STYLE: Style = Style::new().fg(MUTED);

pub mod icons {
    pub const AGENT: &str = "@";
    pub const TOOL: &str = "#";
    pub const ONLINE: &str = "+";
    pub const CONNECTING: &str = "~";
    pub const OFFLINE: &str = "!";
}

pub fn role_color(role: NodeRole) -> Color {
    match role {
        NodeRole::Agent => ACCENT,
        NodeRole::Tool => WARN,
    }
}

pub fn panel_block_style(focused: bool) -> Style {
    if focused {
        Style::new().fg(ACCENT)
    } else {
        Style::new().fg(MUTED)
    }
}
