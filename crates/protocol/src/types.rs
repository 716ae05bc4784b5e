use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;

/// Opaque handle to a DOM element.
///
/// Ids are handed out by the core's allocator for both elements the host
/// discovered while scanning the page and elements the core asked the host
/// to create. The host keeps the id → element mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Element kinds the core can ask the host to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    Div,
    Button,
    Img,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::Button => "button",
            Tag::Img => "img",
        }
    }
}

/// Where a created element goes inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertPosition {
    /// After the last child.
    Append,
    /// Before the first child.
    Prepend,
}

/// Inline style properties touched by the page scripts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleProperty {
    Opacity,
    Transform,
    Transition,
    Cursor,
    Display,
    Overflow,
    Visibility,
    Left,
    Top,
    Width,
    Height,
    /// Any other property by CSS name, including custom properties such
    /// as `--duration`.
    Custom(SharedStr),
}

impl StyleProperty {
    /// The CSS property name as passed to `style.setProperty`.
    pub fn css_name(&self) -> &str {
        match self {
            StyleProperty::Opacity => "opacity",
            StyleProperty::Transform => "transform",
            StyleProperty::Transition => "transition",
            StyleProperty::Cursor => "cursor",
            StyleProperty::Display => "display",
            StyleProperty::Overflow => "overflow",
            StyleProperty::Visibility => "visibility",
            StyleProperty::Left => "left",
            StyleProperty::Top => "top",
            StyleProperty::Width => "width",
            StyleProperty::Height => "height",
            StyleProperty::Custom(name) => name.as_str(),
        }
    }
}

/// Names one intersection observer on the host.
///
/// Observations, their entries and unobserves all carry the id, so a node
/// watched by two observers is tracked by each independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(pub u16);

/// Parameters for an intersection observer. The first `Observe` naming an
/// observer fixes its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserveOptions {
    /// Visible fraction at which the target counts as intersecting.
    pub threshold: f64,
    /// CSS margin applied to the viewport, e.g. `"0px 0px -50px 0px"`.
    pub root_margin: SharedStr,
}

impl ObserveOptions {
    pub fn new(threshold: f64, root_margin: impl Into<SharedStr>) -> Self {
        Self {
            threshold,
            root_margin: root_margin.into(),
        }
    }
}

/// A short oscillator sweep played through the host's audio API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub start_hz: f64,
    pub end_hz: f64,
    pub start_gain: f64,
    pub end_gain: f64,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_property_uses_given_name() {
        let prop = StyleProperty::Custom("--opacity".into());
        assert_eq!(prop.css_name(), "--opacity");
        assert_eq!(StyleProperty::Transform.css_name(), "transform");
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(7).to_string(), "node#7");
    }
}
