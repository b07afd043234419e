use std::fmt::Display;
use std::str::FromStr;

use colorous::{Color, Gradient};

#[derive(Clone, Copy, Debug)]
pub enum PaletteKind {
    Magma,
    Inferno,
    Plasma,
    Viridis,
    Cividis,
    Turbo,
    Warm,
    Cool,
}

impl FromStr for PaletteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "magma" => Ok(PaletteKind::Magma),
            "inferno" => Ok(PaletteKind::Inferno),
            "plasma" => Ok(PaletteKind::Plasma),
            "viridis" => Ok(PaletteKind::Viridis),
            "accessible" | "cividis" => Ok(PaletteKind::Cividis),
            "turbo" => Ok(PaletteKind::Turbo),
            "warm" => Ok(PaletteKind::Warm),
            "cool" => Ok(PaletteKind::Cool),
            _ => Err(format!(
                "Invalid palette: {}. Supported: magma, inferno, plasma, viridis, cividis, turbo, warm, cool",
                s
            )),
        }
    }
}

impl Display for PaletteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PaletteKind::Magma => "magma",
            PaletteKind::Inferno => "inferno",
            PaletteKind::Plasma => "plasma",
            PaletteKind::Viridis => "viridis",
            PaletteKind::Cividis => "cividis",
            PaletteKind::Turbo => "turbo",
            PaletteKind::Warm => "warm",
            PaletteKind::Cool => "cool",
        };
        write!(f, "{}", name)
    }
}

/// Assigns one color per input range by sampling a gradient at evenly
/// spaced positions, in input order.
pub struct Palette {
    gradient: &'static Gradient,
}

impl Palette {
    pub fn new(kind: PaletteKind) -> Self {
        let gradient = match kind {
            PaletteKind::Magma => &colorous::MAGMA,
            PaletteKind::Inferno => &colorous::INFERNO,
            PaletteKind::Plasma => &colorous::PLASMA,
            PaletteKind::Viridis => &colorous::VIRIDIS,
            PaletteKind::Cividis => &colorous::CIVIDIS,
            PaletteKind::Turbo => &colorous::TURBO,
            PaletteKind::Warm => &colorous::WARM,
            PaletteKind::Cool => &colorous::COOL,
        };
        Palette { gradient }
    }

    /// Color for the `index`-th of `total` ranges. A single range gets the
    /// gradient midpoint rather than an endpoint.
    pub fn color(&self, index: usize, total: usize) -> Color {
        let t = if total > 1 {
            index as f64 / (total - 1) as f64
        } else {
            0.5
        };
        self.gradient.eval_continuous(t)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(PaletteKind::Turbo)
    }
}
