//! Computed style values.
//!
//! A [`ComputedStyle`] is the fully resolved snapshot the animation engine
//! blends between. Snapshots are shared behind `Arc` and never mutated once
//! published; blending always writes into a fresh copy.

use crate::animations::AnimationDescriptor;
use common::color::Color;
use common::geometry::{EdgeSizes, Point, Size, Transform};

/// Computed style for an element.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    /// Display type.
    pub display: Display,
    /// Position type.
    pub position: Position,

    /// Position offsets.
    pub top: SizeValue,
    pub right: SizeValue,
    pub bottom: SizeValue,
    pub left: SizeValue,

    /// Dimensions.
    pub width: SizeValue,
    pub height: SizeValue,

    /// Margin.
    pub margin: EdgeValues,
    /// Padding.
    pub padding: EdgeValues,
    /// Border width.
    pub border_width: EdgeSizes,
    /// Border color. `None` sides follow `color`.
    pub border_color: BorderColors,
    /// Border radius.
    pub border_radius: CornerValues,

    /// Outline.
    pub outline_width: f32,
    pub outline_offset: f32,
    pub outline_color: Option<Color>,

    /// Z-index.
    pub z_index: ZIndex,
    /// Visibility.
    pub visibility: Visibility,
    /// Opacity.
    pub opacity: f32,

    /// Colors.
    pub color: Color,
    pub background_color: Color,
    pub text_stroke_color: Option<Color>,

    /// Typography.
    pub line_height: LineHeight,
    pub letter_spacing: f32,
    pub word_spacing: f32,
    pub column_gap: f32,

    /// Transform.
    pub transform: Vec<TransformOperation>,
    pub transform_origin: Point,

    /// Shadows.
    pub box_shadow: Vec<BoxShadow>,
    pub text_shadow: Vec<TextShadow>,

    /// Declared transitions, in declaration order.
    pub transitions: Vec<AnimationDescriptor>,
    /// Declared keyframe animations, in declaration order.
    pub animations: Vec<AnimationDescriptor>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::default(),
            position: Position::default(),
            top: SizeValue::Auto,
            right: SizeValue::Auto,
            bottom: SizeValue::Auto,
            left: SizeValue::Auto,
            width: SizeValue::Auto,
            height: SizeValue::Auto,
            margin: EdgeValues::zero(),
            padding: EdgeValues::zero(),
            border_width: EdgeSizes::ZERO,
            border_color: BorderColors::default(),
            border_radius: CornerValues::default(),
            outline_width: 0.0,
            outline_offset: 0.0,
            outline_color: None,
            z_index: ZIndex::Auto,
            visibility: Visibility::Visible,
            opacity: 1.0,
            color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            text_stroke_color: None,
            line_height: LineHeight::Normal,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            column_gap: 0.0,
            transform: Vec::new(),
            transform_origin: Point::new(50.0, 50.0),
            box_shadow: Vec::new(),
            text_shadow: Vec::new(),
            transitions: Vec::new(),
            animations: Vec::new(),
        }
    }
}

impl ComputedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this style declares any transition or keyframe animation.
    pub fn has_animation_declarations(&self) -> bool {
        !self.transitions.is_empty() || !self.animations.is_empty()
    }

    /// Whether the element establishes a stacking context purely because of
    /// its visual effects.
    pub fn needs_stacking_context(&self) -> bool {
        self.opacity < 1.0 || !self.transform.is_empty()
    }
}

/// Display value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    None,
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
}

/// Position value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

/// Size value (width, height, offsets, margins).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SizeValue {
    #[default]
    Auto,
    Length(f32),
    Percentage(f32),
}

impl SizeValue {
    pub fn resolve(&self, containing: f32) -> f32 {
        match self {
            SizeValue::Auto => 0.0,
            SizeValue::Length(l) => *l,
            SizeValue::Percentage(p) => containing * p / 100.0,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, SizeValue::Auto)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, SizeValue::Length(v) | SizeValue::Percentage(v) if *v == 0.0)
    }
}

/// Edge values (margin, padding).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeValues {
    pub top: SizeValue,
    pub right: SizeValue,
    pub bottom: SizeValue,
    pub left: SizeValue,
}

impl EdgeValues {
    pub fn zero() -> Self {
        Self::all(SizeValue::Length(0.0))
    }

    pub fn all(value: SizeValue) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Corner radii. Each corner is elliptical.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerValues {
    pub top_left: Size,
    pub top_right: Size,
    pub bottom_right: Size,
    pub bottom_left: Size,
}

impl CornerValues {
    pub fn all(radius: Size) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }
}

/// Border colors. `None` means `currentColor`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BorderColors {
    pub top: Option<Color>,
    pub right: Option<Color>,
    pub bottom: Option<Color>,
    pub left: Option<Color>,
}

/// Z-index value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZIndex {
    #[default]
    Auto,
    Number(i32),
}

/// Visibility value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// Line height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LineHeight {
    #[default]
    Normal,
    Number(f32),
    Length(f32),
    Percentage(f32),
}

/// Transform function.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformOperation {
    /// Placeholder produced when a list is padded for blending.
    Identity,
    Translate(f32, f32),
    Scale(f32, f32),
    /// Rotation in degrees.
    Rotate(f32),
    /// Skew angles in degrees.
    Skew(f32, f32),
    Matrix(Transform),
    Perspective(f32),
}

impl TransformOperation {
    /// The operation of the same kind that leaves geometry unchanged.
    pub fn identity_of(&self) -> Option<TransformOperation> {
        Some(match self {
            TransformOperation::Identity => TransformOperation::Identity,
            TransformOperation::Translate(..) => TransformOperation::Translate(0.0, 0.0),
            TransformOperation::Scale(..) => TransformOperation::Scale(1.0, 1.0),
            TransformOperation::Rotate(_) => TransformOperation::Rotate(0.0),
            TransformOperation::Skew(..) => TransformOperation::Skew(0.0, 0.0),
            TransformOperation::Matrix(_) => TransformOperation::Matrix(Transform::identity()),
            TransformOperation::Perspective(_) => return None,
        })
    }

    /// Whether two operations are the same function and can blend.
    pub fn is_same_kind(&self, other: &TransformOperation) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// 2D matrix for this operation. Perspective has no 2D effect.
    pub fn to_matrix(&self) -> Transform {
        match self {
            TransformOperation::Identity | TransformOperation::Perspective(_) => Transform::identity(),
            TransformOperation::Translate(x, y) => Transform::translation(*x, *y),
            TransformOperation::Scale(x, y) => Transform::scale(*x, *y),
            TransformOperation::Rotate(deg) => Transform::rotation(deg.to_radians()),
            TransformOperation::Skew(ax, ay) => Transform::new(
                1.0,
                ay.to_radians().tan(),
                ax.to_radians().tan(),
                1.0,
                0.0,
                0.0,
            ),
            TransformOperation::Matrix(m) => *m,
        }
    }
}

/// Box shadow.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxShadow {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur_radius: f32,
    pub spread_radius: f32,
    pub color: Color,
    pub inset: bool,
}

impl BoxShadow {
    /// A zero-sized transparent shadow with the given inset flag.
    pub fn none(inset: bool) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            blur_radius: 0.0,
            spread_radius: 0.0,
            color: Color::TRANSPARENT,
            inset,
        }
    }
}

/// Text shadow.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShadow {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur_radius: f32,
    pub color: Color,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            blur_radius: 0.0,
            color: Color::TRANSPARENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = ComputedStyle::default();
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.z_index, ZIndex::Auto);
        assert!(!style.needs_stacking_context());
        assert!(!style.has_animation_declarations());
    }

    #[test]
    fn test_size_value() {
        assert_eq!(SizeValue::Percentage(50.0).resolve(200.0), 100.0);
        assert!(SizeValue::Length(0.0).is_zero());
        assert!(!SizeValue::Auto.is_zero());
    }

    #[test]
    fn test_transform_identity_of() {
        let op = TransformOperation::Scale(2.0, 3.0);
        assert_eq!(op.identity_of(), Some(TransformOperation::Scale(1.0, 1.0)));
        assert!(op.is_same_kind(&TransformOperation::Scale(0.5, 0.5)));
        assert!(!op.is_same_kind(&TransformOperation::Rotate(10.0)));
        assert_eq!(TransformOperation::Perspective(100.0).identity_of(), None);
    }

    #[test]
    fn test_stacking_context() {
        let mut style = ComputedStyle::default();
        style.transform.push(TransformOperation::Rotate(45.0));
        assert!(style.needs_stacking_context());
    }
}
