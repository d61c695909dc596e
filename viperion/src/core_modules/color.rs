// THEORY:
// The `Color` module is the smallest unit of the engine: one RGBA pixel plus the
// handful of single-pixel quantities the effects need. Nothing in here looks at
// neighbours; anything spatial (block averages, circles) lives in higher modules.
//
// What lives here:
// - Raw channels (0..255). Alpha only exists so a freshly allocated buffer can be
//   transparent; every color built from image data or produced by a transform is
//   opaque.
// - Packed form: `0x00RRGGBB`, lossless for every 24-bit value.
// - Luma with the BT.709 weights, computed in f64 and never renormalized.
// - The two recolor transforms (invert, grayscale) and the low-cost "redmean"
//   distance used for similarity checks.

pub mod color {
    pub type Channel = u8;
    pub type Packed = u32;
    pub type Luma = f64;
    pub type Distance = f64;

    const RED_WEIGHT: f64 = 0.2126;
    const GREEN_WEIGHT: f64 = 0.7152;
    const BLUE_WEIGHT: f64 = 0.0722;

    /// A single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Color {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha channel value (0-255). 255 for anything derived from image data.
        pub alpha: Channel,
    }

    impl Default for Color {
        fn default() -> Self {
            Color::TRANSPARENT
        }
    }

    impl Color {
        /// Background of a freshly allocated buffer.
        pub const TRANSPARENT: Color = Color {
            red: 0,
            green: 0,
            blue: 0,
            alpha: 0,
        };

        pub const BLACK: Color = Color::new(0, 0, 0);
        pub const WHITE: Color = Color::new(255, 255, 255);

        /// Builds an opaque color.
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Color {
                red,
                green,
                blue,
                alpha: Channel::MAX,
            }
        }

        /// Unpacks `0x00RRGGBB`. Bits above the low 24 are ignored.
        pub const fn from_packed(rgb: Packed) -> Self {
            Color::new(
                ((rgb >> 16) & 0xFF) as Channel,
                ((rgb >> 8) & 0xFF) as Channel,
                (rgb & 0xFF) as Channel,
            )
        }

        /// Packs the color channels as `0x00RRGGBB`.
        pub const fn to_packed(&self) -> Packed {
            ((self.red as Packed) << 16) | ((self.green as Packed) << 8) | self.blue as Packed
        }

        /// Packs all four channels as `0xAARRGGBB`.
        pub const fn to_packed_argb(&self) -> Packed {
            ((self.alpha as Packed) << 24) | self.to_packed()
        }

        pub const fn is_opaque(&self) -> bool {
            self.alpha == Channel::MAX
        }

        /// Perceptual brightness (BT.709 luma) on the 0..255 scale.
        pub fn luma(&self) -> Luma {
            RED_WEIGHT * self.red as f64
                + GREEN_WEIGHT * self.green as f64
                + BLUE_WEIGHT * self.blue as f64
        }

        /// `255 - c` on every color channel.
        pub const fn invert(&self) -> Self {
            Color::new(
                Channel::MAX - self.red,
                Channel::MAX - self.green,
                Channel::MAX - self.blue,
            )
        }

        /// Achromatic color whose channels all equal the truncated luma.
        pub fn to_grayscale(&self) -> Self {
            // Weights sum to 1.0, so the truncated luma always fits a channel.
            let luma = self.luma() as Channel;
            Color::new(luma, luma, luma)
        }

        /// Low-cost "redmean" color distance.
        ///
        /// Weights the red and blue differences by the mean red level so that the
        /// metric tracks perception better than plain Euclidean RGB distance.
        pub fn distance_to(&self, other: &Color) -> Distance {
            let (red1, green1, blue1) = (self.red as i64, self.green as i64, self.blue as i64);
            let (red2, green2, blue2) = (other.red as i64, other.green as i64, other.blue as i64);

            let red_mean = (red1 + red2) / 2;
            let red = red1 - red2;
            let green = green1 - green2;
            let blue = blue1 - blue2;

            let x = 2 + red_mean / 256;
            let y = 2 + (255 - red_mean) / 256;

            ((x * red * red + 4 * green * green + y * blue * blue) as f64).sqrt()
        }

        /// True when the two colors are closer than `threshold`.
        pub fn is_similar_to(&self, other: &Color, threshold: Distance) -> bool {
            self.distance_to(other) < threshold
        }
    }

    impl From<image::Rgba<u8>> for Color {
        /// Image alpha is discarded: decoded pixels are treated as opaque.
        fn from(rgba: image::Rgba<u8>) -> Self {
            let [red, green, blue, _] = rgba.0;
            Color::new(red, green, blue)
        }
    }

    impl From<Color> for image::Rgba<u8> {
        fn from(color: Color) -> Self {
            image::Rgba([color.red, color.green, color.blue, color.alpha])
        }
    }
}
