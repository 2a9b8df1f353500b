//! Named reference colors.
//!
//! The table is constant data. The only non-deterministic entry, `random`, is a
//! [`Swatch::Random`] that draws a new color every time it is resolved.

use rand::Rng;

use crate::color::Color;

pub const RED: Color = Color::new(255, 0, 0);
pub const GREEN: Color = Color::new(0, 255, 0);
pub const BLUE: Color = Color::new(0, 0, 255);
pub const WHITE: Color = Color::new(255, 255, 255);
pub const OFF: Color = Color::new(0, 0, 0);
pub const WARM_LIGHT: Color = Color::new(255, 220, 82);
pub const PINK: Color = Color::new(255, 96, 208);
pub const PURPLE: Color = Color::new(128, 0, 128);
pub const ORANGE: Color = Color::new(255, 165, 0);
pub const YELLOW: Color = Color::new(255, 255, 0);
pub const CYAN: Color = Color::new(0, 255, 255);

/// Every fixed palette entry, in display order.
pub const PALETTE: [(&str, Color); 11] = [
    ("red", RED),
    ("green", GREEN),
    ("blue", BLUE),
    ("white", WHITE),
    ("off", OFF),
    ("warm_light", WARM_LIGHT),
    ("pink", PINK),
    ("purple", PURPLE),
    ("orange", ORANGE),
    ("yellow", YELLOW),
    ("cyan", CYAN),
];

/// A palette entry as returned by [`lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Fixed(Color),
    Random,
}

impl Swatch {
    /// Returns the color for this entry, drawing a fresh one for `Random`.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Color {
        match self {
            Swatch::Fixed(color) => color,
            Swatch::Random => random(rng),
        }
    }
}

/// Finds a palette entry by name, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<Swatch> {
    if name.eq_ignore_ascii_case("random") {
        return Some(Swatch::Random);
    }
    PALETTE
        .iter()
        .find(|(entry, _)| entry.eq_ignore_ascii_case(name))
        .map(|(_, color)| Swatch::Fixed(*color))
}

/// Uniformly random color.
pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::new(rng.random(), rng.random(), rng.random())
}
