use std::fmt;
use std::str::FromStr;

/// The fixed set of facial regions that get their own surface.
///
/// Declaration order is the iteration order everywhere (layout maps,
/// extracted regions, surface creation), so when the pool runs out of
/// capacity mid-tick the earlier names win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionName {
    LeftEyebrow,
    RightEyebrow,
    LeftEye,
    RightEye,
    Nose,
    Mouth,
    LeftEar,
    RightEar,
    Chin,
}

impl RegionName {
    pub const ALL: [RegionName; 9] = [
        RegionName::LeftEyebrow,
        RegionName::RightEyebrow,
        RegionName::LeftEye,
        RegionName::RightEye,
        RegionName::Nose,
        RegionName::Mouth,
        RegionName::LeftEar,
        RegionName::RightEar,
        RegionName::Chin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RegionName::LeftEyebrow => "leftEyebrow",
            RegionName::RightEyebrow => "rightEyebrow",
            RegionName::LeftEye => "leftEye",
            RegionName::RightEye => "rightEye",
            RegionName::Nose => "nose",
            RegionName::Mouth => "mouth",
            RegionName::LeftEar => "leftEar",
            RegionName::RightEar => "rightEar",
            RegionName::Chin => "chin",
        }
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown region name: {s}"))
    }
}
