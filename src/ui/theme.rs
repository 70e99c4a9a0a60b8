use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub status_info: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub row_highlight_bg: Color,
    pub row_highlight_fg: Color,
    pub cpu_sparkline: Color,
    pub memory_sparkline: Color,
}

impl Theme {
    /// Unknown names fall back to the dark theme.
    pub fn from_config(theme_name: &str) -> Self {
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn next(&self) -> Self {
        match self.name {
            "dark" => Self::light(),
            "light" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            status_ok: Color::Green,
            status_err: Color::Red,
            status_info: Color::Cyan,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Green,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            row_highlight_bg: Color::Rgb(49, 50, 68),
            row_highlight_fg: Color::White,
            cpu_sparkline: Color::Rgb(251, 146, 60),
            memory_sparkline: Color::Rgb(103, 232, 249),
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            status_ok: Color::Rgb(0, 120, 0),
            status_err: Color::Red,
            status_info: Color::Blue,
            statusbar_bg: Color::Rgb(220, 220, 220),
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::Rgb(90, 90, 90),
            accent: Color::Blue,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            row_highlight_bg: Color::Rgb(190, 210, 235),
            row_highlight_fg: Color::Black,
            cpu_sparkline: Color::Rgb(200, 100, 0),
            memory_sparkline: Color::Rgb(70, 130, 180),
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::White,
            header_accent_fg: Color::Black,
            status_ok: Color::White,
            status_err: Color::White,
            status_info: Color::Gray,
            statusbar_bg: Color::Black,
            overlay_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::White,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::Gray,
            surface_bg: Color::Black,
            row_highlight_bg: Color::White,
            row_highlight_fg: Color::Black,
            cpu_sparkline: Color::White,
            memory_sparkline: Color::Gray,
        }
    }
}
