//! Value types for the viewport math: points, sizes, rects and margins.
//!
//! All lengths are CSS pixels. Margin sides accept absolute pixels, a
//! percentage of the container edge, or `auto` (no constraint); resolution
//! yields `Option<f64>` per side, `None` meaning unconstrained.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    pub fn scaled(&self, scale: f64) -> Size {
        Size::new(self.width * scale, self.height * scale)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn scaled(&self, scale: f64) -> Rect {
        Rect::new(
            self.x * scale,
            self.y * scale,
            self.width * scale,
            self.height * scale,
        )
    }
}

/// One side of a content margin: absolute pixels, a percentage of the
/// container edge, or unconstrained.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MarginValue {
    #[default]
    Auto,
    Px(f64),
    Percent(f64),
}

impl MarginValue {
    /// Resolve against the matching container edge length.
    /// `Auto` resolves to `None`.
    pub fn resolve(&self, base: f64) -> Option<f64> {
        match *self {
            MarginValue::Auto => None,
            MarginValue::Px(px) => Some(px),
            MarginValue::Percent(pct) => Some(base * pct / 100.0),
        }
    }
}

impl FromStr for MarginValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(MarginValue::Auto);
        }
        if let Some(num) = s.strip_suffix('%') {
            return num
                .trim()
                .parse::<f64>()
                .map(MarginValue::Percent)
                .map_err(|_| format!("invalid percentage: {s:?}"));
        }
        s.parse::<f64>()
            .map(MarginValue::Px)
            .map_err(|_| format!("invalid margin: {s:?}"))
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Auto => write!(f, "auto"),
            MarginValue::Px(px) => write!(f, "{px}"),
            MarginValue::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

impl Serialize for MarginValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            MarginValue::Px(px) => serializer.serialize_f64(px),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for MarginValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MarginVisitor;

        impl Visitor<'_> for MarginVisitor {
            type Value = MarginValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number, a percentage string, or \"auto\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<MarginValue, E> {
                Ok(MarginValue::Px(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MarginValue, E> {
                Ok(MarginValue::Px(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MarginValue, E> {
                Ok(MarginValue::Px(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MarginValue, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(MarginVisitor)
    }
}

/// Content margin configuration, one value per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: MarginValue,
    pub left: MarginValue,
    pub bottom: MarginValue,
    pub right: MarginValue,
}

impl Margin {
    pub fn auto() -> Self {
        Margin::default()
    }

    /// Resolve all four sides against the container size. Left/right use the
    /// container width as the percentage base, top/bottom the height.
    pub fn resolve(&self, container: Size) -> ResolvedMargin {
        ResolvedMargin {
            top: self.top.resolve(container.height),
            left: self.left.resolve(container.width),
            bottom: self.bottom.resolve(container.height),
            right: self.right.resolve(container.width),
        }
    }
}

/// Margins resolved to absolute pixels; `None` = unconstrained side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResolvedMargin {
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub bottom: Option<f64>,
    pub right: Option<f64>,
}
