//! Animatable property identifiers.

use common::error::{EngineError, EngineResult};
use std::fmt;
use std::str::FromStr;

macro_rules! animatable_properties {
    ($($variant:ident => $name:literal,)+) => {
        /// A longhand property that transitions and keyframe animations can drive.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PropertyId {
            $($variant,)+
        }

        impl PropertyId {
            /// Every animatable property, in declaration order.
            pub const ALL: &'static [PropertyId] = &[$(PropertyId::$variant,)+];

            /// CSS name of the property.
            pub fn name(&self) -> &'static str {
                match self {
                    $(PropertyId::$variant => $name,)+
                }
            }

            /// Look a property up by its CSS name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name.to_ascii_lowercase().as_str() {
                    $($name => Some(PropertyId::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

animatable_properties! {
    // Box offsets and dimensions
    Left => "left",
    Right => "right",
    Top => "top",
    Bottom => "bottom",
    Width => "width",
    Height => "height",

    // Margin and padding
    MarginTop => "margin-top",
    MarginRight => "margin-right",
    MarginBottom => "margin-bottom",
    MarginLeft => "margin-left",
    PaddingTop => "padding-top",
    PaddingRight => "padding-right",
    PaddingBottom => "padding-bottom",
    PaddingLeft => "padding-left",

    // Borders
    BorderTopWidth => "border-top-width",
    BorderRightWidth => "border-right-width",
    BorderBottomWidth => "border-bottom-width",
    BorderLeftWidth => "border-left-width",
    BorderTopColor => "border-top-color",
    BorderRightColor => "border-right-color",
    BorderBottomColor => "border-bottom-color",
    BorderLeftColor => "border-left-color",
    BorderTopLeftRadius => "border-top-left-radius",
    BorderTopRightRadius => "border-top-right-radius",
    BorderBottomRightRadius => "border-bottom-right-radius",
    BorderBottomLeftRadius => "border-bottom-left-radius",

    // Outline
    OutlineWidth => "outline-width",
    OutlineOffset => "outline-offset",
    OutlineColor => "outline-color",

    // Colors and visibility
    Color => "color",
    BackgroundColor => "background-color",
    TextStrokeColor => "text-stroke-color",
    Opacity => "opacity",
    Visibility => "visibility",
    ZIndex => "z-index",

    // Text
    LineHeight => "line-height",
    LetterSpacing => "letter-spacing",
    WordSpacing => "word-spacing",
    ColumnGap => "column-gap",

    // Effects
    Transform => "transform",
    TransformOrigin => "transform-origin",
    BoxShadow => "box-shadow",
    TextShadow => "text-shadow",
}

impl FromStr for PropertyId {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        Self::from_name(s).ok_or_else(|| EngineError::unknown_property(s))
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The property a transition descriptor targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionProperty {
    /// The `all` wildcard.
    All,
    Property(PropertyId),
}

impl TransitionProperty {
    /// Whether this target includes `property`.
    #[inline]
    pub fn covers(&self, property: PropertyId) -> bool {
        match self {
            TransitionProperty::All => true,
            TransitionProperty::Property(p) => *p == property,
        }
    }

    /// CSS name, as reported in `transitionend` events.
    pub fn name(&self) -> &'static str {
        match self {
            TransitionProperty::All => "all",
            TransitionProperty::Property(p) => p.name(),
        }
    }
}

impl From<PropertyId> for TransitionProperty {
    fn from(property: PropertyId) -> Self {
        TransitionProperty::Property(property)
    }
}

impl FromStr for TransitionProperty {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        if s.eq_ignore_ascii_case("all") {
            Ok(TransitionProperty::All)
        } else {
            s.parse().map(TransitionProperty::Property)
        }
    }
}

impl fmt::Display for TransitionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for property in PropertyId::ALL {
            assert_eq!(PropertyId::from_name(property.name()), Some(*property));
        }
    }

    #[test]
    fn test_unknown_property() {
        let err = "font-smooth".parse::<PropertyId>().unwrap_err();
        assert_eq!(err, EngineError::unknown_property("font-smooth"));
    }

    #[test]
    fn test_transition_property() {
        assert_eq!("ALL".parse::<TransitionProperty>().unwrap(), TransitionProperty::All);
        let left: TransitionProperty = "left".parse().unwrap();
        assert!(left.covers(PropertyId::Left));
        assert!(!left.covers(PropertyId::Top));
        assert!(TransitionProperty::All.covers(PropertyId::Opacity));
        assert_eq!(TransitionProperty::All.to_string(), "all");
    }
}
