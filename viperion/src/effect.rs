// THEORY:
// The closed set of effects the engine knows. Whether an effect needs a numeric
// parameter is a property of the variant itself, answered by an exhaustive
// `match`, so adding a variant forces the dispatcher's validation to be updated.

use std::fmt;
use std::str::FromStr;

/// One of the six effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Copy the image unchanged (re-encoded as PNG).
    Normal,
    /// Replace every pixel with its luma.
    BlackAndWhite,
    /// `255 - c` on every channel.
    InvertColors,
    /// Shrink by the block size, one averaged pixel per block.
    Compress,
    /// Mosaic of block-averaged tiles.
    Pixelate,
    /// Random filled circles of locally averaged color.
    Pointillism,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::Normal,
        Effect::BlackAndWhite,
        Effect::InvertColors,
        Effect::Compress,
        Effect::Pixelate,
        Effect::Pointillism,
    ];

    /// True for effects driven by a block size or circle diameter.
    pub const fn requires_parameter(self) -> bool {
        match self {
            Effect::Normal | Effect::BlackAndWhite | Effect::InvertColors => false,
            Effect::Compress | Effect::Pixelate | Effect::Pointillism => true,
        }
    }

    /// Stable numeric code; negative codes are the parameterized effects.
    pub const fn code(self) -> i32 {
        match self {
            Effect::Normal => 0,
            Effect::BlackAndWhite => 1,
            Effect::InvertColors => 2,
            Effect::Compress => -1,
            Effect::Pixelate => -2,
            Effect::Pointillism => -3,
        }
    }

    pub fn from_code(code: i32) -> Option<Effect> {
        Effect::ALL.into_iter().find(|effect| effect.code() == code)
    }

    /// Command line name.
    pub const fn name(self) -> &'static str {
        match self {
            Effect::Normal => "normal",
            Effect::BlackAndWhite => "black-and-white",
            Effect::InvertColors => "invert-colors",
            Effect::Compress => "compress",
            Effect::Pixelate => "pixelate",
            Effect::Pointillism => "pointillism",
        }
    }

    /// What the numeric parameter means, for help text and error messages.
    pub const fn parameter_meaning(self) -> Option<&'static str> {
        match self {
            Effect::Compress | Effect::Pixelate => Some("block size"),
            Effect::Pointillism => Some("circle diameter"),
            Effect::Normal | Effect::BlackAndWhite | Effect::InvertColors => None,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEffect(pub String);

impl fmt::Display for UnknownEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown effect '{}'", self.0)
    }
}

impl std::error::Error for UnknownEffect {}

impl FromStr for Effect {
    type Err = UnknownEffect;

    /// Accepts the command line name, case-insensitively, with `_` or `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Effect::ALL
            .into_iter()
            .find(|effect| effect.name() == normalized)
            .ok_or_else(|| UnknownEffect(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_table() {
        let needing: Vec<Effect> = Effect::ALL
            .into_iter()
            .filter(|e| e.requires_parameter())
            .collect();
        assert_eq!(
            needing,
            vec![Effect::Compress, Effect::Pixelate, Effect::Pointillism]
        );
        for effect in Effect::ALL {
            assert_eq!(effect.requires_parameter(), effect.code() < 0);
            assert_eq!(
                effect.requires_parameter(),
                effect.parameter_meaning().is_some()
            );
        }
    }

    #[test]
    fn names_round_trip() {
        for effect in Effect::ALL {
            assert_eq!(effect.name().parse::<Effect>(), Ok(effect));
            assert_eq!(Effect::from_code(effect.code()), Some(effect));
        }
        assert_eq!("BLACK_AND_WHITE".parse::<Effect>(), Ok(Effect::BlackAndWhite));
        assert!("sepia".parse::<Effect>().is_err());
        assert_eq!(Effect::from_code(7), None);
    }
}
