use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn scale(self, s: f32) -> Rgb {
        let s = s.clamp(0.0, 1.0);
        Rgb {
            r: (self.r as f32 * s + 0.5) as u8,
            g: (self.g as f32 * s + 0.5) as u8,
            b: (self.b as f32 * s + 0.5) as u8,
        }
    }

    pub(crate) fn to_color(self, enable_color: bool) -> Color {
        if enable_color {
            Color::Rgb {
                r: self.r,
                g: self.g,
                b: self.b,
            }
        } else {
            Color::White
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Section {
    Hero,
    About,
    Experience,
    Skills,
    Projects,
    Contact,
}

impl Section {
    pub(crate) const ALL: [Section; 6] = [
        Section::Hero,
        Section::About,
        Section::Experience,
        Section::Skills,
        Section::Projects,
        Section::Contact,
    ];

    pub(crate) fn id(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Experience => "experience",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Contact => "contact",
        }
    }

    pub(crate) fn from_id(id: &str) -> Option<Section> {
        let id = id.trim();
        Section::ALL
            .into_iter()
            .find(|s| s.id().eq_ignore_ascii_case(id))
    }

    pub(crate) fn color(self) -> Rgb {
        section_color(self.id())
    }
}

// First entry doubles as the fallback.
const SECTION_COLORS: &[(&str, Rgb)] = &[
    ("hero", Rgb::new(0, 255, 0)),
    ("about", Rgb::new(0, 255, 255)),
    ("skills", Rgb::new(255, 0, 255)),
    ("projects", Rgb::new(255, 255, 0)),
    ("contact", Rgb::new(255, 100, 0)),
];

pub(crate) fn default_color() -> Rgb {
    SECTION_COLORS[0].1
}

/// Theme colour for a section id. Unmapped ids get the hero colour.
pub(crate) fn section_color(id: &str) -> Rgb {
    SECTION_COLORS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, c)| *c)
        .unwrap_or_else(default_color)
}

/// Static backdrop used when motion is disabled: the dark radial vignette
/// that otherwise sits under the particle field.
pub(crate) fn vignette(nx: f32, ny: f32) -> Rgb {
    let dx = nx - 0.5;
    let dy = ny - 0.5;
    let d = ((dx * dx + dy * dy).sqrt() * 2.0).clamp(0.0, 1.0);
    let g = (4.0 * (1.0 - d)) as u8;
    Rgb::new(0, g, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mapped_sections_get_their_color() {
        assert_eq!(section_color("hero"), Rgb::new(0, 255, 0));
        assert_eq!(section_color("about"), Rgb::new(0, 255, 255));
        assert_eq!(section_color("skills"), Rgb::new(255, 0, 255));
        assert_eq!(section_color("projects"), Rgb::new(255, 255, 0));
        assert_eq!(section_color("contact"), Rgb::new(255, 100, 0));
    }

    #[test]
    fn unknown_ids_fall_back_to_default() {
        assert_eq!(section_color("nope"), default_color());
        assert_eq!(section_color(""), default_color());
        assert_eq!(Section::Experience.color(), default_color());
    }

    #[test]
    fn section_ids_round_trip() {
        for s in Section::ALL {
            assert_eq!(Section::from_id(s.id()), Some(s));
        }
        assert_eq!(Section::from_id(" Skills "), Some(Section::Skills));
        assert_eq!(Section::from_id("footer"), None);
    }

    #[test]
    fn scale_clamps() {
        let c = Rgb::new(200, 100, 50);
        assert_eq!(c.scale(0.5), Rgb::new(100, 50, 25));
        assert_eq!(c.scale(3.0), c);
    }
}
