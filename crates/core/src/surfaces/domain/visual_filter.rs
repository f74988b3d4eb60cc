//! Post-processing applied to every cropped region before display.
//!
//! Operations follow the CSS filter functions of the same names and are
//! applied in a fixed order: grayscale, sepia, brightness, contrast, invert.

use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualFilter {
    /// 0.0 = unchanged, 1.0 = fully desaturated.
    pub grayscale: f32,
    /// 0.0 = unchanged, 1.0 = full sepia tone.
    pub sepia: f32,
    /// Multiplier; 1.0 = unchanged.
    pub brightness: f32,
    /// Multiplier around mid-gray; 1.0 = unchanged.
    pub contrast: f32,
    /// 0.0 = unchanged, 1.0 = fully inverted.
    pub invert: f32,
}

impl VisualFilter {
    pub const IDENTITY: VisualFilter = VisualFilter {
        grayscale: 0.0,
        sepia: 0.0,
        brightness: 1.0,
        contrast: 1.0,
        invert: 0.0,
    };

    /// Filters one RGB pixel.
    pub fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut c = rgb.map(|v| v as f32 / 255.0);

        if self.grayscale > 0.0 {
            let luma = 0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2];
            c = c.map(|v| lerp(v, luma, self.grayscale));
        }
        if self.sepia > 0.0 {
            let toned = [
                0.393 * c[0] + 0.769 * c[1] + 0.189 * c[2],
                0.349 * c[0] + 0.686 * c[1] + 0.168 * c[2],
                0.272 * c[0] + 0.534 * c[1] + 0.131 * c[2],
            ];
            c = [0, 1, 2].map(|i| lerp(c[i], toned[i], self.sepia).min(1.0));
        }
        if self.brightness != 1.0 {
            c = c.map(|v| (v * self.brightness).clamp(0.0, 1.0));
        }
        if self.contrast != 1.0 {
            c = c.map(|v| ((v - 0.5) * self.contrast + 0.5).clamp(0.0, 1.0));
        }
        if self.invert > 0.0 {
            c = c.map(|v| lerp(v, 1.0 - v, self.invert));
        }

        c.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
    }

    pub fn apply_in_place(&self, rgb_data: &mut [u8]) {
        if *self == Self::IDENTITY {
            return;
        }
        for px in rgb_data.chunks_exact_mut(3) {
            let out = self.apply([px[0], px[1], px[2]]);
            px.copy_from_slice(&out);
        }
    }
}

impl Default for VisualFilter {
    fn default() -> Self {
        FilterPreset::default().filter()
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Named grayscale looks selectable from the command line.
///
/// `Contrast` is the overlay's standard look; the other five are the
/// alternative looks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterPreset {
    /// Grayscale with 150% contrast.
    #[default]
    Contrast,
    /// Grayscale with 200% contrast.
    Strong,
    /// Grayscale, 150% brightness, 150% contrast.
    Bright,
    /// Grayscale negative.
    Invert,
    /// Grayscale with a half sepia tint and 150% contrast.
    Sepia,
    /// Grayscale, 50% brightness, 300% contrast.
    Dark,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 6] = [
        FilterPreset::Contrast,
        FilterPreset::Strong,
        FilterPreset::Bright,
        FilterPreset::Invert,
        FilterPreset::Sepia,
        FilterPreset::Dark,
    ];

    pub fn filter(self) -> VisualFilter {
        let gray = VisualFilter {
            grayscale: 1.0,
            ..VisualFilter::IDENTITY
        };
        match self {
            FilterPreset::Contrast => VisualFilter {
                contrast: 1.5,
                ..gray
            },
            FilterPreset::Strong => VisualFilter {
                contrast: 2.0,
                ..gray
            },
            FilterPreset::Bright => VisualFilter {
                brightness: 1.5,
                contrast: 1.5,
                ..gray
            },
            FilterPreset::Invert => VisualFilter { invert: 1.0, ..gray },
            FilterPreset::Sepia => VisualFilter {
                sepia: 0.5,
                contrast: 1.5,
                ..gray
            },
            FilterPreset::Dark => VisualFilter {
                brightness: 0.5,
                contrast: 3.0,
                ..gray
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterPreset::Contrast => "contrast",
            FilterPreset::Strong => "strong",
            FilterPreset::Bright => "bright",
            FilterPreset::Invert => "invert",
            FilterPreset::Sepia => "sepia",
            FilterPreset::Dark => "dark",
        }
    }
}

impl FromStr for FilterPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterPreset::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = FilterPreset::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown filter '{s}', expected one of: {}", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_identity_leaves_pixel_unchanged() {
        assert_eq!(VisualFilter::IDENTITY.apply([12, 200, 99]), [12, 200, 99]);
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let f = VisualFilter {
            grayscale: 1.0,
            ..VisualFilter::IDENTITY
        };
        let [r, g, b] = f.apply([255, 0, 0]);
        assert_eq!(r, g);
        assert_eq!(g, b);
        // 0.2126 * 255 ≈ 54
        assert_eq!(r, 54);
    }

    #[test]
    fn test_contrast_pushes_away_from_mid_gray() {
        let f = VisualFilter {
            contrast: 2.0,
            ..VisualFilter::IDENTITY
        };
        assert_eq!(f.apply([200, 50, 200]), [255, 0, 255]);
    }

    #[test]
    fn test_contrast_preserves_mid_gray() {
        let f = FilterPreset::Dark.filter();
        let [r, _, _] = VisualFilter {
            brightness: 1.0,
            ..f
        }
        .apply([128, 128, 128]);
        assert!((r as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_invert() {
        let f = VisualFilter {
            invert: 1.0,
            ..VisualFilter::IDENTITY
        };
        assert_eq!(f.apply([0, 255, 100]), [255, 0, 155]);
    }

    #[test]
    fn test_brightness_clamps() {
        let f = VisualFilter {
            brightness: 2.0,
            ..VisualFilter::IDENTITY
        };
        assert_eq!(f.apply([200, 50, 0]), [255, 100, 0]);
    }

    #[rstest]
    #[case(FilterPreset::Contrast)]
    #[case(FilterPreset::Strong)]
    #[case(FilterPreset::Bright)]
    #[case(FilterPreset::Invert)]
    #[case(FilterPreset::Dark)]
    fn test_gray_presets_produce_gray_pixels(#[case] preset: FilterPreset) {
        let [r, g, b] = preset.filter().apply([30, 180, 90]);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn test_sepia_tints_warm() {
        let [r, _, b] = FilterPreset::Sepia.filter().apply([120, 120, 120]);
        assert!(r > b);
    }

    #[test]
    fn test_default_is_grayscale_contrast() {
        let f = VisualFilter::default();
        assert_eq!(f.grayscale, 1.0);
        assert_eq!(f.contrast, 1.5);
    }

    #[test]
    fn test_strong_preset_doubles_contrast() {
        let f = FilterPreset::Strong.filter();
        assert_eq!(f.grayscale, 1.0);
        assert_eq!(f.contrast, 2.0);
        assert_ne!(f, VisualFilter::default());
        assert_eq!(FilterPreset::ALL.len(), 6);
    }

    #[test]
    fn test_apply_in_place_touches_every_pixel() {
        let mut data = vec![255, 0, 0, 0, 0, 255];
        FilterPreset::Contrast.filter().apply_in_place(&mut data);
        assert_eq!(data[0], data[1]);
        assert_eq!(data[3], data[4]);
    }

    #[rstest]
    #[case("contrast", FilterPreset::Contrast)]
    #[case("strong", FilterPreset::Strong)]
    #[case("bright", FilterPreset::Bright)]
    #[case("invert", FilterPreset::Invert)]
    #[case("sepia", FilterPreset::Sepia)]
    #[case("dark", FilterPreset::Dark)]
    fn test_parse_preset(#[case] text: &str, #[case] preset: FilterPreset) {
        assert_eq!(text.parse::<FilterPreset>().unwrap(), preset);
    }

    #[test]
    fn test_parse_unknown_preset_lists_choices() {
        let err = "neon".parse::<FilterPreset>().unwrap_err();
        assert!(err.contains("contrast"));
    }
}
