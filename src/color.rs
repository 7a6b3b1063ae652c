//! Node colors as given by the editor (`#rgb` or `#rrggbb`).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const fn gray(level: u8) -> Self {
        Rgb::new(level, level, level)
    }

    pub fn parse_hex(value: &str) -> Option<Rgb> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                let mut channels = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Rgb::new(channels.next()??, channels.next()??, channels.next()??))
            }
            6 => Some(Rgb::new(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            _ => None,
        }
    }

    /// Parses `value`, falling back to `default` for anything unreadable.
    pub fn parse_or(value: &str, default: Rgb) -> Rgb {
        match Rgb::parse_hex(value) {
            Some(rgb) => rgb,
            None => {
                tracing::warn!(color = value, "unsupported color, using default");
                default
            }
        }
    }

    /// Channels scaled to the 0..=1 range PDF color operators expect.
    pub fn components(&self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }
}
