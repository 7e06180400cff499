use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub panel: Color32,
    /// Outline of the widget that currently has focus.
    pub focus: Color32,
    /// Outline of widgets hidden at the current step.
    pub hidden: Color32,
    pub click_badge: Color32,
    pub auto_badge: Color32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xC8),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            panel: Color32::from_rgb(0x2D, 0x2D, 0x2D),
            focus: Color32::from_rgb(0xE8, 0xA8, 0x38),
            hidden: Color32::from_rgb(0x55, 0x55, 0x55),
            click_badge: Color32::from_rgb(0xFF, 0x7E, 0x67),
            auto_badge: Color32::from_rgb(0x5C, 0xDB, 0x95),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::WHITE,
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            panel: Color32::from_rgb(0xF5, 0xF5, 0xF5),
            focus: Color32::from_rgb(0xB8, 0x7B, 0x0A),
            hidden: Color32::from_rgb(0xBB, 0xBB, 0xBB),
            click_badge: Color32::from_rgb(0xC7, 0x3E, 0x1D),
            auto_badge: Color32::from_rgb(0x1E, 0x8A, 0x5A),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }
}
