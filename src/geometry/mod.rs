//! Geometric primitives for widget placement.
//!
//! Coordinates are PDF user-space units with the origin at the lower-left
//! corner of the page. A widget whose rectangle could not be resolved
//! carries the sentinel rect; callers must treat it as "unknown", never as
//! a zero-area rectangle at the origin.

use serde::{Deserialize, Serialize};

/// A rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the lower-left corner
    pub x: f32,
    /// Y coordinate of the lower-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use formatlas::geometry::Rect;
    ///
    /// let rect = Rect::new(72.0, 680.0, 180.0, 14.0);
    /// assert_eq!(rect.width, 180.0);
    /// assert_eq!(rect.height, 14.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points, normalizing corner order.
    ///
    /// PDF `/Rect` arrays may list corners in any order; the result always
    /// has non-negative width and height.
    ///
    /// # Examples
    ///
    /// ```
    /// use formatlas::geometry::Rect;
    ///
    /// let rect = Rect::from_points(252.0, 694.0, 72.0, 680.0);
    /// assert_eq!(rect.x, 72.0);
    /// assert_eq!(rect.y, 680.0);
    /// assert_eq!(rect.width, 180.0);
    /// assert_eq!(rect.height, 14.0);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let x = x0.min(x1);
        let y = y0.min(y1);
        Self {
            x,
            y,
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// The sentinel rectangle recorded when no geometry could be resolved.
    pub fn sentinel() -> Self {
        Self {
            x: -1.0,
            y: -1.0,
            width: -1.0,
            height: -1.0,
        }
    }

    /// Whether this is the unresolved-geometry sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.x == -1.0 && self.y == -1.0 && self.width == -1.0 && self.height == -1.0
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Compute the area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}
