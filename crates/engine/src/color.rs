use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// One of the four raw liquid channels, measured in integer millilitres.
///
/// The discriminant order (red, green, blue, dark) is the order used by every
/// component vector in the shop, see [`PotionType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Green,
    Blue,
    Dark,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Dark];

    /// Canonical name stored in the ml ledger.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Dark => "dark",
        }
    }

    /// Position of the channel inside a component vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Green => 1,
            Color::Blue => 2,
            Color::Dark => 3,
        }
    }
}

impl core::fmt::Display for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Color {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            "dark" => Ok(Color::Dark),
            other => Err(EngineError::InvalidMix(format!("unknown color: {other}"))),
        }
    }
}

/// A `(red, green, blue, dark)` component vector.
///
/// For a recipe the components are the millilitres consumed by one bottle and
/// must sum to [`PotionType::BOTTLE_ML`]. For a barrel exactly one component is
/// non-zero and names the channel the barrel fills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PotionType(pub [i64; 4]);

impl PotionType {
    pub const BOTTLE_ML: i64 = 100;

    #[must_use]
    pub const fn new(red: i64, green: i64, blue: i64, dark: i64) -> Self {
        Self([red, green, blue, dark])
    }

    /// Vector with [`PotionType::BOTTLE_ML`] on a single channel.
    #[must_use]
    pub const fn pure(color: Color) -> Self {
        let mut components = [0; 4];
        components[color.index()] = Self::BOTTLE_ML;
        Self(components)
    }

    #[must_use]
    pub const fn get(&self, color: Color) -> i64 {
        self.0[color.index()]
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.0.iter().sum()
    }

    /// Check the vector describes a bottle recipe.
    pub fn ensure_recipe(&self) -> ResultEngine<()> {
        if self.0.iter().any(|c| *c < 0) {
            return Err(EngineError::InvalidMix(format!(
                "{self}: components must be >= 0"
            )));
        }
        if self.total() != Self::BOTTLE_ML {
            return Err(EngineError::InvalidMix(format!(
                "{self}: components must sum to {}",
                Self::BOTTLE_ML
            )));
        }
        Ok(())
    }

    /// The only channel with a positive component, if the vector has exactly one.
    pub fn single_channel(&self) -> ResultEngine<Color> {
        if self.0.iter().any(|c| *c < 0) {
            return Err(EngineError::InvalidMix(format!(
                "{self}: components must be >= 0"
            )));
        }
        let mut channels = Color::ALL.into_iter().filter(|c| self.get(*c) > 0);
        match (channels.next(), channels.next()) {
            (Some(color), None) => Ok(color),
            _ => Err(EngineError::InvalidMix(format!(
                "{self}: barrels must fill exactly one channel"
            ))),
        }
    }
}

impl From<[i64; 4]> for PotionType {
    fn from(value: [i64; 4]) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for PotionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [r, g, b, d] = self.0;
        write!(f, "[{r}, {g}, {b}, {d}]")
    }
}
