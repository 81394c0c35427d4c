//! Dimensions, positions and overlay anchors.

use serde::{Deserialize, Serialize};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Create a size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Top-left offset in pixels, possibly negative when an overlay exceeds
/// its base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset
    pub x: i64,
    /// Vertical offset
    pub y: i64,
}

/// Where an overlay is placed on a base image.
///
/// # Examples
///
/// ```
/// use mindia_core::{Anchor, Position, Size};
///
/// let anchor: Anchor = "topcenter".parse().unwrap();
/// assert_eq!(anchor, "centertop".parse().unwrap());
///
/// let pos = Anchor::BottomRight.position(Size::new(200, 100), Size::new(20, 10), 5);
/// assert_eq!(pos, Position { x: 175, y: 85 });
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Top-left corner
    #[display("topleft")]
    TopLeft,
    /// Middle of the top edge
    #[display("topcenter")]
    TopCenter,
    /// Top-right corner
    #[display("topright")]
    TopRight,
    /// Middle of the left edge
    #[display("leftcenter")]
    LeftCenter,
    /// Center of the image
    #[display("center")]
    Center,
    /// Middle of the right edge
    #[display("rightcenter")]
    RightCenter,
    /// Bottom-left corner
    #[display("bottomleft")]
    BottomLeft,
    /// Middle of the bottom edge
    #[display("bottomcenter")]
    BottomCenter,
    /// Bottom-right corner
    #[default]
    #[display("bottomright")]
    BottomRight,
}

impl Anchor {
    /// Overlay offset for a base of size `base`, an overlay of size
    /// `overlay` and `padding` pixels from the anchored edges.
    pub fn position(&self, base: Size, overlay: Size, padding: u32) -> Position {
        let (bw, bh) = (i64::from(base.width), i64::from(base.height));
        let (ow, oh) = (i64::from(overlay.width), i64::from(overlay.height));
        let p = i64::from(padding);

        let left = p;
        let hcenter = bw / 2 - ow / 2;
        let right = bw - ow - p;
        let top = p;
        let vcenter = bh / 2 - oh / 2;
        let bottom = bh - oh - p;

        let (x, y) = match self {
            Anchor::TopLeft => (left, top),
            Anchor::TopCenter => (hcenter, top),
            Anchor::TopRight => (right, top),
            Anchor::LeftCenter => (left, vcenter),
            Anchor::Center => (hcenter, vcenter),
            Anchor::RightCenter => (right, vcenter),
            Anchor::BottomLeft => (left, bottom),
            Anchor::BottomCenter => (hcenter, bottom),
            Anchor::BottomRight => (right, bottom),
        };
        Position { x, y }
    }
}

impl std::str::FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "topleft" | "lefttop" => Ok(Anchor::TopLeft),
            "topcenter" | "centertop" => Ok(Anchor::TopCenter),
            "topright" | "righttop" => Ok(Anchor::TopRight),
            "leftcenter" | "centerleft" => Ok(Anchor::LeftCenter),
            "center" => Ok(Anchor::Center),
            "rightcenter" | "centerright" => Ok(Anchor::RightCenter),
            "bottomleft" | "leftbottom" => Ok(Anchor::BottomLeft),
            "bottomcenter" | "centerbottom" => Ok(Anchor::BottomCenter),
            "bottomright" | "rightbottom" => Ok(Anchor::BottomRight),
            _ => Err(format!("Unknown anchor: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn display_parses_back() {
        for anchor in Anchor::iter() {
            assert_eq!(anchor.to_string().parse::<Anchor>().unwrap(), anchor);
        }
    }

    #[test]
    fn positions() {
        let base = Size::new(100, 80);
        let overlay = Size::new(20, 10);
        assert_eq!(Anchor::TopLeft.position(base, overlay, 4), Position { x: 4, y: 4 });
        assert_eq!(Anchor::Center.position(base, overlay, 4), Position { x: 40, y: 35 });
        assert_eq!(Anchor::RightCenter.position(base, overlay, 4), Position { x: 76, y: 35 });
        assert_eq!(Anchor::BottomCenter.position(base, overlay, 4), Position { x: 40, y: 66 });
    }

    #[test]
    fn rejects_unknown() {
        assert!("middle".parse::<Anchor>().is_err());
    }
}
