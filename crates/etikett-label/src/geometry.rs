// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dot-unit geometry shared by the label commands.

use serde::{Deserialize, Serialize};

/// Width and height in printer dots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Same size with the axes swapped (90°/270° rotation).
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Axis-aligned rectangle in printer dots. May extend to negative
/// coordinates when a rotated element is anchored near the label edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// Rotation bucket used both in the command and for bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    Normal = 0,
    Rotated90 = 1,
    Rotated180 = 2,
    Rotated270 = 3,
}

impl Quadrant {
    /// Reduce a rotation in degrees to its quadrant. Rotations that are not a
    /// multiple of 90 fall back to the next lower quadrant.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) / 90 {
            0 => Self::Normal,
            1 => Self::Rotated90,
            2 => Self::Rotated180,
            _ => Self::Rotated270,
        }
    }

    /// Digit emitted in the EPL2 rotation field.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Re-anchor an unrotated box of `size` whose origin is `(x, y)`.
    /// Coordinates saturate at the `i32` range.
    pub fn bounding_rect(self, x: i32, y: i32, size: Size) -> Rect {
        match self {
            Self::Normal => Rect::new(x, y, size.width, size.height),
            Self::Rotated90 => Rect::new(x.saturating_sub(size.height), y, size.height, size.width),
            Self::Rotated180 => Rect::new(
                x.saturating_sub(size.width),
                y.saturating_sub(size.height),
                size.width,
                size.height,
            ),
            Self::Rotated270 => Rect::new(x, y.saturating_sub(size.width), size.height, size.width),
        }
    }
}

/// Drawing mode of a straight line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    #[default]
    Black,
    White,
    Xor,
}

impl LineType {
    /// Letter following `L` in the line command.
    pub fn command_letter(self) -> char {
        match self {
            Self::Black => 'O',
            Self::White => 'W',
            Self::Xor => 'E',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_reduces_to_quadrant() {
        assert_eq!(Quadrant::from_degrees(0), Quadrant::Normal);
        assert_eq!(Quadrant::from_degrees(90), Quadrant::Rotated90);
        assert_eq!(Quadrant::from_degrees(180), Quadrant::Rotated180);
        assert_eq!(Quadrant::from_degrees(270), Quadrant::Rotated270);
        assert_eq!(Quadrant::from_degrees(450), Quadrant::Rotated90);
        assert_eq!(Quadrant::from_degrees(-90), Quadrant::Rotated270);
    }

    #[test]
    fn odd_angles_round_down() {
        assert_eq!(Quadrant::from_degrees(45), Quadrant::Normal);
        assert_eq!(Quadrant::from_degrees(179), Quadrant::Rotated90);
        assert_eq!(Quadrant::from_degrees(359), Quadrant::Rotated270);
    }

    #[test]
    fn bounding_rect_per_quadrant() {
        let size = Size::new(40, 10);
        assert_eq!(
            Quadrant::Normal.bounding_rect(100, 200, size),
            Rect::new(100, 200, 40, 10)
        );
        assert_eq!(
            Quadrant::Rotated90.bounding_rect(100, 200, size),
            Rect::new(90, 200, 10, 40)
        );
        assert_eq!(
            Quadrant::Rotated180.bounding_rect(100, 200, size),
            Rect::new(60, 190, 40, 10)
        );
        assert_eq!(
            Quadrant::Rotated270.bounding_rect(100, 200, size),
            Rect::new(100, 160, 10, 40)
        );
    }

    #[test]
    fn extreme_anchors_saturate() {
        let size = Size::new(40, 10);
        assert_eq!(
            Quadrant::Rotated90.bounding_rect(i32::MIN, 0, size),
            Rect::new(i32::MIN, 0, 10, 40)
        );
        assert_eq!(
            Quadrant::Rotated180.bounding_rect(i32::MIN, i32::MIN, size).y,
            i32::MIN
        );
        assert_eq!(Rect::new(i32::MAX, i32::MAX, 5, 5).right(), i32::MAX);
        assert_eq!(Rect::new(i32::MAX, i32::MAX, 5, 5).bottom(), i32::MAX);
    }
}
