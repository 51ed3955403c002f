use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `h` in degrees, `s` and `l` in percent.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let s = (s / 100.0).clamp(0.0, 1.0);
        let l = (l / 100.0).clamp(0.0, 1.0);
        let h = h.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }
}

pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const ROCKET_GOLD: Color = Color::rgb(255, 209, 102);
pub const EMBER_ORANGE: Color = Color::rgb(255, 122, 24);

pub const BRIGHT_PALETTE: [Color; 8] = [
    Color::rgb(255, 89, 94),
    Color::rgb(255, 202, 58),
    Color::rgb(138, 201, 38),
    Color::rgb(25, 130, 196),
    Color::rgb(106, 76, 147),
    Color::rgb(255, 146, 76),
    Color::rgb(0, 187, 249),
    Color::rgb(241, 91, 181),
];

/// How a run colors its particles.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorMode {
    /// `hsl(random, 85%, 60%)` per particle.
    RandomHue,
    /// Three palette colors chosen once for the whole run.
    Trio([Color; 3]),
}

impl ColorMode {
    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.gen_bool(0.5) {
            ColorMode::RandomHue
        } else {
            let mut picks = [Color::rgb(0, 0, 0); 3];
            for slot in picks.iter_mut() {
                *slot = BRIGHT_PALETTE[rng.gen_range(0..BRIGHT_PALETTE.len())];
            }
            ColorMode::Trio(picks)
        }
    }

    pub fn pick(&self, rng: &mut impl Rng) -> Color {
        match self {
            ColorMode::RandomHue => random_hue(rng),
            ColorMode::Trio(trio) => trio[rng.gen_range(0..trio.len())],
        }
    }
}

pub fn random_hue(rng: &mut impl Rng) -> Color {
    Color::from_hsl(rng.gen_range(0.0..360.0), 85.0, 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn hsl_primaries() {
        assert_eq!(Color::from_hsl(0.0, 100.0, 50.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hsl(120.0, 100.0, 50.0), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hsl(240.0, 100.0, 50.0), Color::rgb(0, 0, 255));
        assert_eq!(Color::from_hsl(42.0, 0.0, 100.0), WHITE);
    }

    #[test]
    fn trio_only_yields_its_colors() {
        let mut rng = Pcg64::seed_from_u64(7);
        let trio = [BRIGHT_PALETTE[0], BRIGHT_PALETTE[3], BRIGHT_PALETTE[5]];
        let mode = ColorMode::Trio(trio);
        for _ in 0..50 {
            assert!(trio.contains(&mode.pick(&mut rng)));
        }
    }
}
