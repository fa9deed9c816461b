//! The canonical 16:9 resolution ladder.
//!
//! Axis interpolation works on indices into this ladder, so the variants must
//! stay declared in ascending order.

use std::fmt;
use std::str::FromStr;

/// A standard 16:9 output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resolution {
    R240p,
    R360p,
    R480p,
    R720p,
    R1080p,
    R1440p,
    R2160p,
    R4320p,
}

/// All supported resolutions, ascending.
const LADDER: [Resolution; 8] = [
    Resolution::R240p,
    Resolution::R360p,
    Resolution::R480p,
    Resolution::R720p,
    Resolution::R1080p,
    Resolution::R1440p,
    Resolution::R2160p,
    Resolution::R4320p,
];

impl Resolution {
    /// The canonical ascending list of supported resolutions.
    #[must_use]
    pub fn ladder() -> &'static [Resolution] {
        &LADDER
    }

    /// Position of this resolution in the canonical ladder.
    #[must_use]
    pub fn ladder_index(self) -> usize {
        self as usize
    }

    /// Output width in pixels.
    #[must_use]
    pub fn width(self) -> u32 {
        self.dimensions().0
    }

    /// Output height in pixels.
    #[must_use]
    pub fn height(self) -> u32 {
        self.dimensions().1
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::R240p => (426, 240),
            Resolution::R360p => (640, 360),
            Resolution::R480p => (854, 480),
            Resolution::R720p => (1280, 720),
            Resolution::R1080p => (1920, 1080),
            Resolution::R1440p => (2560, 1440),
            Resolution::R2160p => (3840, 2160),
            Resolution::R4320p => (7680, 4320),
        }
    }

    /// Human-readable label, e.g. `"720p (HD)"`. Used for table headers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Resolution::R240p => "240p (SD)",
            Resolution::R360p => "360p (SD)",
            Resolution::R480p => "480p (SD)",
            Resolution::R720p => "720p (HD)",
            Resolution::R1080p => "1080p (FHD)",
            Resolution::R1440p => "1440p (QHD)",
            Resolution::R2160p => "2160p (4K)",
            Resolution::R4320p => "4320p (8K)",
        }
    }

    /// `WxH` form used in output file names, e.g. `"1280x720"`.
    #[must_use]
    pub fn file_name(self) -> String {
        let (w, h) = self.dimensions();
        format!("{w}x{h}")
    }

    /// Looks up a ladder entry by exact pixel dimensions.
    #[must_use]
    pub fn from_dimensions(width: u32, height: u32) -> Option<Resolution> {
        LADDER.iter().copied().find(|r| r.dimensions() == (width, height))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Parses the short name (`"720p"`, case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "240p" => Ok(Resolution::R240p),
            "360p" => Ok(Resolution::R360p),
            "480p" => Ok(Resolution::R480p),
            "720p" => Ok(Resolution::R720p),
            "1080p" => Ok(Resolution::R1080p),
            "1440p" => Ok(Resolution::R1440p),
            "2160p" | "4k" => Ok(Resolution::R2160p),
            "4320p" | "8k" => Ok(Resolution::R4320p),
            other => Err(format!(
                "unsupported resolution '{other}' (expected one of 240p, 360p, 480p, 720p, 1080p, 1440p, 2160p, 4320p)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_ascending() {
        let ladder = Resolution::ladder();
        for pair in ladder.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].width() < pair[1].width());
        }
    }

    #[test]
    fn ladder_index_matches_position() {
        for (i, res) in Resolution::ladder().iter().enumerate() {
            assert_eq!(res.ladder_index(), i);
        }
    }

    #[test]
    fn parses_short_names() {
        assert_eq!("720p".parse::<Resolution>().unwrap(), Resolution::R720p);
        assert_eq!("1080P".parse::<Resolution>().unwrap(), Resolution::R1080p);
        assert_eq!("4k".parse::<Resolution>().unwrap(), Resolution::R2160p);
        assert!("500p".parse::<Resolution>().is_err());
    }

    #[test]
    fn file_name_is_width_x_height() {
        assert_eq!(Resolution::R720p.file_name(), "1280x720");
        assert_eq!(Resolution::R4320p.file_name(), "7680x4320");
    }

    #[test]
    fn from_dimensions_round_trips() {
        for res in Resolution::ladder() {
            let (w, h) = res.dimensions();
            assert_eq!(Resolution::from_dimensions(w, h), Some(*res));
        }
        assert_eq!(Resolution::from_dimensions(123, 456), None);
    }
}
