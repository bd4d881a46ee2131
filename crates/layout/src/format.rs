use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Every card is drawn on a canvas this wide; design lengths are given at this width.
pub const CANVAS_WIDTH: u32 = 1080;

/// Width and height in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}
impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The same box at a higher pixel density.
    pub fn scaled(&self, ratio: u32) -> Self {
        Self { width: self.width * ratio, height: self.height * ratio }
    }
}
impl Display for Size {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Target rendition of a card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// 4:5 grid post, 1080x1350.
    #[default]
    Feed,
    /// 9:16 vertical story, 1080x1920.
    Story,
}
impl Format {
    pub const ALL: [Format; 2] = [Format::Feed, Format::Story];

    pub fn canvas(&self) -> Size {
        match self {
            Self::Feed => Size::new(CANVAS_WIDTH, 1350),
            Self::Story => Size::new(CANVAS_WIDTH, 1920),
        }
    }

    /// Share of the canvas height taken by the photo; the text band gets the rest.
    pub fn image_band_ratio(&self) -> f32 {
        match self {
            Self::Feed => 0.62,
            Self::Story => 0.72,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Story => "story",
        }
    }
}
impl FromStr for Format {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "feed" => Ok(Self::Feed),
            "story" => Ok(Self::Story),
            _ => exn::bail!(ErrorKind::UnknownFormat(s.to_string())),
        }
    }
}
impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
