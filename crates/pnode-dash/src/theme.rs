//! Colour palettes for the pNode dashboard

use pnode_types::NodeState;
use ratatui::style::Color;

#[derive(Clone, Debug)]
pub struct Theme {
    pub name: String,

    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub label: Color,
    pub accent: Color,

    // Node status
    pub online: Color,
    pub offline: Color,
    pub unknown: Color,
    pub warning: Color,

    pub active_tab: Color,
    pub inactive_tab: Color,
    pub selected_bg: Color,

    pub chart_primary: Color,
    pub chart_secondary: Color,
}

impl Theme {
    pub const NAMES: [&'static str; 3] = ["ocean", "light", "mono"];

    /// Unknown names fall back to the default palette.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" => Self::mono(),
            _ => Self::ocean(),
        }
    }

    pub fn ocean() -> Self {
        Self {
            name: "ocean".to_string(),
            border: Color::Rgb(60, 80, 110),
            title: Color::Rgb(120, 200, 255),
            text: Color::Rgb(210, 215, 225),
            label: Color::Rgb(130, 140, 160),
            accent: Color::Rgb(0, 200, 200),
            online: Color::Rgb(80, 220, 120),
            offline: Color::Rgb(255, 90, 90),
            unknown: Color::Rgb(170, 170, 180),
            warning: Color::Rgb(255, 190, 60),
            active_tab: Color::Rgb(0, 200, 200),
            inactive_tab: Color::Rgb(90, 100, 120),
            selected_bg: Color::Rgb(30, 45, 70),
            chart_primary: Color::Rgb(0, 180, 255),
            chart_secondary: Color::Rgb(180, 120, 255),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            border: Color::Rgb(170, 175, 190),
            title: Color::Rgb(20, 60, 120),
            text: Color::Rgb(40, 40, 50),
            label: Color::Rgb(100, 100, 115),
            accent: Color::Rgb(0, 110, 200),
            online: Color::Rgb(0, 130, 60),
            offline: Color::Rgb(200, 30, 30),
            unknown: Color::Rgb(120, 120, 130),
            warning: Color::Rgb(190, 120, 0),
            active_tab: Color::Rgb(0, 110, 200),
            inactive_tab: Color::Rgb(140, 140, 150),
            selected_bg: Color::Rgb(220, 230, 245),
            chart_primary: Color::Rgb(0, 110, 200),
            chart_secondary: Color::Rgb(130, 0, 130),
        }
    }

    /// Plain terminal colours only.
    pub fn mono() -> Self {
        Self {
            name: "mono".to_string(),
            border: Color::DarkGray,
            title: Color::White,
            text: Color::Gray,
            label: Color::DarkGray,
            accent: Color::White,
            online: Color::Green,
            offline: Color::Red,
            unknown: Color::Gray,
            warning: Color::Yellow,
            active_tab: Color::White,
            inactive_tab: Color::DarkGray,
            selected_bg: Color::DarkGray,
            chart_primary: Color::White,
            chart_secondary: Color::Gray,
        }
    }

    pub fn status_color(&self, status: NodeState) -> Color {
        match status {
            NodeState::Online => self.online,
            NodeState::Offline => self.offline,
            NodeState::Unknown => self.unknown,
        }
    }

    /// Green at or above 90%, amber at or above 60%, red below.
    pub fn uptime_color(&self, percent: f64) -> Color {
        if percent >= 90.0 {
            self.online
        } else if percent >= 60.0 {
            self.warning
        } else {
            self.offline
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::ocean()
    }
}
