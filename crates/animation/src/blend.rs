//! Interpolation of individual style value types.

use common::color::Color;
use common::geometry::{Point, Size};
use common::lerp;
use style::computed::{
    BoxShadow, LineHeight, SizeValue, TextShadow, TransformOperation, Visibility, ZIndex,
};

/// A value that can be interpolated between two endpoints.
///
/// `progress` is normally in `[0, 1]` but timing functions may overshoot.
pub trait Blend: Sized {
    fn blend(from: &Self, to: &Self, progress: f64) -> Self;
}

impl Blend for f32 {
    #[inline]
    fn blend(from: &f32, to: &f32, progress: f64) -> f32 {
        lerp(*from as f64, *to as f64, progress) as f32
    }
}

impl Blend for f64 {
    #[inline]
    fn blend(from: &f64, to: &f64, progress: f64) -> f64 {
        lerp(*from, *to, progress)
    }
}

impl Blend for i32 {
    #[inline]
    fn blend(from: &i32, to: &i32, progress: f64) -> i32 {
        lerp(*from as f64, *to as f64, progress).round() as i32
    }
}

impl Blend for Color {
    fn blend(from: &Color, to: &Color, progress: f64) -> Color {
        from.interpolate(*to, progress)
    }
}

impl Blend for Size {
    fn blend(from: &Size, to: &Size, progress: f64) -> Size {
        from.lerp(*to, progress)
    }
}

impl Blend for Point {
    fn blend(from: &Point, to: &Point, progress: f64) -> Point {
        from.lerp(*to, progress)
    }
}

impl Blend for SizeValue {
    /// Lengths blend with lengths and percentages with percentages. A zero
    /// on either side takes the other side's unit. Anything else, including
    /// `auto`, snaps to `to`.
    fn blend(from: &SizeValue, to: &SizeValue, progress: f64) -> SizeValue {
        match (from, to) {
            (SizeValue::Length(a), SizeValue::Length(b)) => SizeValue::Length(f32::blend(a, b, progress)),
            (SizeValue::Percentage(a), SizeValue::Percentage(b)) => {
                SizeValue::Percentage(f32::blend(a, b, progress))
            }
            (SizeValue::Length(_), SizeValue::Percentage(b)) if from.is_zero() => {
                SizeValue::Percentage(f32::blend(&0.0, b, progress))
            }
            (SizeValue::Percentage(_), SizeValue::Length(b)) if from.is_zero() => {
                SizeValue::Length(f32::blend(&0.0, b, progress))
            }
            (SizeValue::Length(a), SizeValue::Percentage(_)) if to.is_zero() => {
                SizeValue::Length(f32::blend(a, &0.0, progress))
            }
            (SizeValue::Percentage(a), SizeValue::Length(_)) if to.is_zero() => {
                SizeValue::Percentage(f32::blend(a, &0.0, progress))
            }
            _ => *to,
        }
    }
}

impl Blend for LineHeight {
    fn blend(from: &LineHeight, to: &LineHeight, progress: f64) -> LineHeight {
        match (from, to) {
            (LineHeight::Number(a), LineHeight::Number(b)) => LineHeight::Number(f32::blend(a, b, progress)),
            (LineHeight::Length(a), LineHeight::Length(b)) => LineHeight::Length(f32::blend(a, b, progress)),
            (LineHeight::Percentage(a), LineHeight::Percentage(b)) => {
                LineHeight::Percentage(f32::blend(a, b, progress))
            }
            _ => *to,
        }
    }
}

impl Blend for ZIndex {
    fn blend(from: &ZIndex, to: &ZIndex, progress: f64) -> ZIndex {
        match (from, to) {
            (ZIndex::Number(a), ZIndex::Number(b)) => ZIndex::Number(i32::blend(a, b, progress)),
            _ => *to,
        }
    }
}

impl Blend for Visibility {
    /// Any nonzero weight of `visible` counts as visible; the hidden value
    /// used otherwise comes from whichever endpoint is not visible.
    fn blend(from: &Visibility, to: &Visibility, progress: f64) -> Visibility {
        let weight = |v: &Visibility| if *v == Visibility::Visible { 1.0 } else { 0.0 };
        let (a, b) = (weight(from), weight(to));
        if a == b {
            return *to;
        }
        if lerp(a, b, progress) > 0.0 {
            Visibility::Visible
        } else if *to != Visibility::Visible {
            *to
        } else {
            *from
        }
    }
}

impl Blend for BoxShadow {
    fn blend(from: &BoxShadow, to: &BoxShadow, progress: f64) -> BoxShadow {
        if from == to {
            return to.clone();
        }
        BoxShadow {
            offset_x: f32::blend(&from.offset_x, &to.offset_x, progress),
            offset_y: f32::blend(&from.offset_y, &to.offset_y, progress),
            blur_radius: f32::blend(&from.blur_radius, &to.blur_radius, progress).max(0.0),
            spread_radius: f32::blend(&from.spread_radius, &to.spread_radius, progress),
            color: Color::blend(&from.color, &to.color, progress),
            inset: to.inset,
        }
    }
}

impl Blend for TextShadow {
    fn blend(from: &TextShadow, to: &TextShadow, progress: f64) -> TextShadow {
        if from == to {
            return to.clone();
        }
        TextShadow {
            offset_x: f32::blend(&from.offset_x, &to.offset_x, progress),
            offset_y: f32::blend(&from.offset_y, &to.offset_y, progress),
            blur_radius: f32::blend(&from.blur_radius, &to.blur_radius, progress).max(0.0),
            color: Color::blend(&from.color, &to.color, progress),
        }
    }
}

impl Blend for Vec<BoxShadow> {
    /// Missing entries blend against a transparent zero shadow.
    fn blend(from: &Vec<BoxShadow>, to: &Vec<BoxShadow>, progress: f64) -> Vec<BoxShadow> {
        if from == to {
            return to.clone();
        }
        (0..from.len().max(to.len()))
            .map(|i| match (from.get(i), to.get(i)) {
                (Some(a), Some(b)) => BoxShadow::blend(a, b, progress),
                (Some(a), None) => BoxShadow::blend(a, &BoxShadow::none(a.inset), progress),
                (None, Some(b)) => BoxShadow::blend(&BoxShadow::none(b.inset), b, progress),
                (None, None) => BoxShadow::none(false),
            })
            .collect()
    }
}

impl Blend for Vec<TextShadow> {
    fn blend(from: &Vec<TextShadow>, to: &Vec<TextShadow>, progress: f64) -> Vec<TextShadow> {
        if from == to {
            return to.clone();
        }
        let none = TextShadow::default();
        (0..from.len().max(to.len()))
            .map(|i| {
                TextShadow::blend(
                    from.get(i).unwrap_or(&none),
                    to.get(i).unwrap_or(&none),
                    progress,
                )
            })
            .collect()
    }
}

/// Blend one transform function. Returns `None` when the pair cannot be
/// interpolated function-by-function.
pub fn blend_transform_operation(
    from: Option<&TransformOperation>,
    to: Option<&TransformOperation>,
    progress: f64,
) -> Option<TransformOperation> {
    let (from, to) = match (from, to) {
        (Some(a), Some(b)) => (a.clone(), b.clone()),
        (None, Some(b)) => (b.identity_of()?, b.clone()),
        (Some(a), None) => (a.clone(), a.identity_of()?),
        (None, None) => return None,
    };

    let f = |a: &f32, b: &f32| f32::blend(a, b, progress);
    Some(match (&from, &to) {
        (TransformOperation::Identity, TransformOperation::Identity) => TransformOperation::Identity,
        (TransformOperation::Translate(ax, ay), TransformOperation::Translate(bx, by)) => {
            TransformOperation::Translate(f(ax, bx), f(ay, by))
        }
        (TransformOperation::Scale(ax, ay), TransformOperation::Scale(bx, by)) => {
            TransformOperation::Scale(f(ax, bx), f(ay, by))
        }
        (TransformOperation::Rotate(a), TransformOperation::Rotate(b)) => TransformOperation::Rotate(f(a, b)),
        (TransformOperation::Skew(ax, ay), TransformOperation::Skew(bx, by)) => {
            TransformOperation::Skew(f(ax, bx), f(ay, by))
        }
        (TransformOperation::Matrix(a), TransformOperation::Matrix(b)) => {
            TransformOperation::Matrix(a.lerp(b, progress))
        }
        (TransformOperation::Perspective(a), TransformOperation::Perspective(b)) => {
            TransformOperation::Perspective(f(a, b))
        }
        _ => return None,
    })
}

/// Whether two transform lists can blend function-by-function.
pub fn transform_lists_match(from: &[TransformOperation], to: &[TransformOperation]) -> bool {
    from.iter().zip(to).all(|(a, b)| a.is_same_kind(b))
}

impl Blend for Vec<TransformOperation> {
    /// Pairwise blend when the function lists line up; otherwise the result
    /// snaps from `from` to `to` halfway through.
    fn blend(
        from: &Vec<TransformOperation>,
        to: &Vec<TransformOperation>,
        progress: f64,
    ) -> Vec<TransformOperation> {
        if from == to {
            return to.clone();
        }
        if !transform_lists_match(from, to) {
            return if progress > 0.5 { to.clone() } else { from.clone() };
        }

        let blended: Option<Vec<_>> = (0..from.len().max(to.len()))
            .map(|i| blend_transform_operation(from.get(i), to.get(i), progress))
            .collect();
        blended.unwrap_or_else(|| if progress > 0.5 { to.clone() } else { from.clone() })
    }
}
