//! The property interpolation library.
//!
//! Each animatable property gets one [`PropertyWrapper`] that knows how to
//! compare two snapshots on that property and how to write a blended value
//! into an output snapshot. The table is built once from an
//! [`AnimationConfig`] and shared read-only.

use crate::blend::Blend;
use crate::config::AnimationConfig;
use common::color::Color;
use std::collections::HashMap;
use std::fmt;
use style::computed::{ComputedStyle, TransformOperation};
use style::properties::{PropertyId, TransitionProperty};
use tracing::debug;

/// Opacity used instead of exactly 1 as a blend origin so the compositor
/// keeps the layer alive for the whole effect.
const ACCELERATED_OPACITY_CEILING: f32 = 0.999_999;

/// Compare-and-blend strategy for one property.
pub trait PropertyWrapper: Send + Sync {
    fn property(&self) -> PropertyId;

    fn equals(&self, a: &ComputedStyle, b: &ComputedStyle) -> bool;

    fn blend(&self, dst: &mut ComputedStyle, from: &ComputedStyle, to: &ComputedStyle, progress: f64);

    /// Whether the effect is handed to the compositor instead of being
    /// recomputed on every software tick.
    fn is_accelerated(&self) -> bool {
        false
    }
}

/// A property stored in a single style field of a [`Blend`] type.
pub struct FieldWrapper<T> {
    property: PropertyId,
    get: fn(&ComputedStyle) -> &T,
    get_mut: fn(&mut ComputedStyle) -> &mut T,
}

impl<T> FieldWrapper<T> {
    pub fn new(
        property: PropertyId,
        get: fn(&ComputedStyle) -> &T,
        get_mut: fn(&mut ComputedStyle) -> &mut T,
    ) -> Self {
        Self { property, get, get_mut }
    }
}

impl<T: Blend + PartialEq + Send + Sync> PropertyWrapper for FieldWrapper<T> {
    fn property(&self) -> PropertyId {
        self.property
    }

    fn equals(&self, a: &ComputedStyle, b: &ComputedStyle) -> bool {
        (self.get)(a) == (self.get)(b)
    }

    fn blend(&self, dst: &mut ComputedStyle, from: &ComputedStyle, to: &ComputedStyle, progress: f64) {
        *(self.get_mut)(dst) = T::blend((self.get)(from), (self.get)(to), progress);
    }
}

/// A color that may be unset, in which case it follows the `color` property.
pub struct CurrentColorWrapper {
    property: PropertyId,
    get: fn(&ComputedStyle) -> Option<Color>,
    set: fn(&mut ComputedStyle, Option<Color>),
}

impl CurrentColorWrapper {
    fn resolved(&self, style: &ComputedStyle) -> Color {
        (self.get)(style).unwrap_or(style.color)
    }
}

impl PropertyWrapper for CurrentColorWrapper {
    fn property(&self) -> PropertyId {
        self.property
    }

    fn equals(&self, a: &ComputedStyle, b: &ComputedStyle) -> bool {
        self.resolved(a) == self.resolved(b)
    }

    fn blend(&self, dst: &mut ComputedStyle, from: &ComputedStyle, to: &ComputedStyle, progress: f64) {
        let (a, b) = (self.resolved(from), self.resolved(to));
        (self.set)(dst, Some(Color::blend(&a, &b, progress)));
    }
}

/// Opacity blended on the compositor.
pub struct AcceleratedOpacityWrapper;

impl PropertyWrapper for AcceleratedOpacityWrapper {
    fn property(&self) -> PropertyId {
        PropertyId::Opacity
    }

    fn equals(&self, a: &ComputedStyle, b: &ComputedStyle) -> bool {
        a.opacity == b.opacity
    }

    fn blend(&self, dst: &mut ComputedStyle, from: &ComputedStyle, to: &ComputedStyle, progress: f64) {
        let start = if from.opacity == 1.0 {
            ACCELERATED_OPACITY_CEILING
        } else {
            from.opacity
        };
        dst.opacity = f32::blend(&start, &to.opacity, progress);
    }

    fn is_accelerated(&self) -> bool {
        true
    }
}

/// Transform blended on the compositor. An empty origin list becomes the
/// identity of each target function so the list always blends pairwise.
pub struct AcceleratedTransformWrapper;

impl PropertyWrapper for AcceleratedTransformWrapper {
    fn property(&self) -> PropertyId {
        PropertyId::Transform
    }

    fn equals(&self, a: &ComputedStyle, b: &ComputedStyle) -> bool {
        a.transform == b.transform
    }

    fn blend(&self, dst: &mut ComputedStyle, from: &ComputedStyle, to: &ComputedStyle, progress: f64) {
        let identity: Vec<TransformOperation>;
        let start = if from.transform.is_empty() {
            identity = to
                .transform
                .iter()
                .map(|op| op.identity_of().unwrap_or(TransformOperation::Identity))
                .collect();
            &identity
        } else {
            &from.transform
        };
        dst.transform = Vec::<TransformOperation>::blend(start, &to.transform, progress);
    }

    fn is_accelerated(&self) -> bool {
        true
    }
}

macro_rules! field {
    ($property:ident, $($path:ident).+) => {
        Box::new(FieldWrapper::new(
            PropertyId::$property,
            |s| &s.$($path).+,
            |s| &mut s.$($path).+,
        ))
    };
}

macro_rules! current_color {
    ($property:ident, $($path:ident).+) => {
        Box::new(CurrentColorWrapper {
            property: PropertyId::$property,
            get: |s| s.$($path).+,
            set: |s, c| s.$($path).+ = c,
        })
    };
}

/// Immutable registry of property wrappers.
pub struct PropertyWrapperTable {
    wrappers: Vec<Box<dyn PropertyWrapper>>,
    index: HashMap<PropertyId, usize>,
}

impl PropertyWrapperTable {
    /// Build the table. Properties listed in the config's accelerated set
    /// get the compositor strategy where one exists.
    pub fn new(config: &AnimationConfig) -> Self {
        let opacity: Box<dyn PropertyWrapper> = if config.is_accelerated(PropertyId::Opacity) {
            Box::new(AcceleratedOpacityWrapper)
        } else {
            field!(Opacity, opacity)
        };
        let transform: Box<dyn PropertyWrapper> = if config.is_accelerated(PropertyId::Transform) {
            Box::new(AcceleratedTransformWrapper)
        } else {
            field!(Transform, transform)
        };

        let wrappers: Vec<Box<dyn PropertyWrapper>> = vec![
            field!(Left, left),
            field!(Right, right),
            field!(Top, top),
            field!(Bottom, bottom),
            field!(Width, width),
            field!(Height, height),
            field!(MarginTop, margin.top),
            field!(MarginRight, margin.right),
            field!(MarginBottom, margin.bottom),
            field!(MarginLeft, margin.left),
            field!(PaddingTop, padding.top),
            field!(PaddingRight, padding.right),
            field!(PaddingBottom, padding.bottom),
            field!(PaddingLeft, padding.left),
            field!(BorderTopWidth, border_width.top),
            field!(BorderRightWidth, border_width.right),
            field!(BorderBottomWidth, border_width.bottom),
            field!(BorderLeftWidth, border_width.left),
            current_color!(BorderTopColor, border_color.top),
            current_color!(BorderRightColor, border_color.right),
            current_color!(BorderBottomColor, border_color.bottom),
            current_color!(BorderLeftColor, border_color.left),
            field!(BorderTopLeftRadius, border_radius.top_left),
            field!(BorderTopRightRadius, border_radius.top_right),
            field!(BorderBottomRightRadius, border_radius.bottom_right),
            field!(BorderBottomLeftRadius, border_radius.bottom_left),
            field!(OutlineWidth, outline_width),
            field!(OutlineOffset, outline_offset),
            current_color!(OutlineColor, outline_color),
            field!(Color, color),
            field!(BackgroundColor, background_color),
            current_color!(TextStrokeColor, text_stroke_color),
            opacity,
            field!(Visibility, visibility),
            field!(ZIndex, z_index),
            field!(LineHeight, line_height),
            field!(LetterSpacing, letter_spacing),
            field!(WordSpacing, word_spacing),
            field!(ColumnGap, column_gap),
            transform,
            field!(TransformOrigin, transform_origin),
            field!(BoxShadow, box_shadow),
            field!(TextShadow, text_shadow),
        ];

        let index = wrappers
            .iter()
            .enumerate()
            .map(|(i, w)| (w.property(), i))
            .collect();

        debug!(count = wrappers.len(), "built property wrapper table");
        Self { wrappers, index }
    }

    pub fn get(&self, property: PropertyId) -> Option<&dyn PropertyWrapper> {
        self.index.get(&property).map(|&i| self.wrappers[i].as_ref())
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn PropertyWrapper> {
        self.wrappers.iter().map(|w| w.as_ref())
    }

    /// Whether `a` and `b` agree on `property`. For `all`, every wrapped
    /// property must agree.
    pub fn properties_equal(&self, property: TransitionProperty, a: &ComputedStyle, b: &ComputedStyle) -> bool {
        if std::ptr::eq(a, b) {
            return true;
        }
        match property {
            TransitionProperty::All => self.iter().all(|w| w.equals(a, b)),
            TransitionProperty::Property(p) => self.get(p).map_or(true, |w| w.equals(a, b)),
        }
    }

    /// Blend `property` into `dst`. For `all`, every property that differs
    /// between `from` and `to` is blended. Returns whether any blended
    /// property needs software ticks.
    pub fn blend_properties(
        &self,
        property: TransitionProperty,
        dst: &mut ComputedStyle,
        from: &ComputedStyle,
        to: &ComputedStyle,
        progress: f64,
    ) -> bool {
        match property {
            TransitionProperty::All => {
                let mut needs_software = false;
                for wrapper in self.iter().filter(|w| !w.equals(from, to)) {
                    wrapper.blend(dst, from, to, progress);
                    needs_software |= !wrapper.is_accelerated();
                }
                needs_software
            }
            TransitionProperty::Property(p) => self.blend_property(p, dst, from, to, progress),
        }
    }

    /// Blend a single property into `dst`.
    pub fn blend_property(
        &self,
        property: PropertyId,
        dst: &mut ComputedStyle,
        from: &ComputedStyle,
        to: &ComputedStyle,
        progress: f64,
    ) -> bool {
        match self.get(property) {
            Some(wrapper) => {
                wrapper.blend(dst, from, to, progress);
                !wrapper.is_accelerated()
            }
            None => false,
        }
    }

    /// Whether `property` is animated on the compositor.
    pub fn is_accelerated(&self, property: PropertyId) -> bool {
        self.get(property).is_some_and(|w| w.is_accelerated())
    }
}

impl fmt::Debug for PropertyWrapperTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyWrapperTable")
            .field("properties", &self.wrappers.len())
            .finish()
    }
}
