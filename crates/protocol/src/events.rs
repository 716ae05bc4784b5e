use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::types::{NodeId, ObserverId};

/// Input forwarded from the browser to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    /// A click on a node the core registered or created.
    Click { node: NodeId },

    /// Click on an in-page anchor (`href="#..."`). `target` is the element
    /// the fragment resolves to, if the host found one.
    AnchorClick {
        href: SharedStr,
        target: Option<NodeId>,
    },

    /// A form submission with the current field values.
    Submit {
        form: NodeId,
        name: String,
        email: String,
    },

    /// The value of an input element changed.
    Input { node: NodeId, value: String },

    KeyDown(KeyInput),

    /// The window scrolled; `y` is the vertical scroll offset in pixels.
    Scroll { y: f64 },

    /// A node watched by `observer` entered or left the viewport.
    Intersection {
        observer: ObserverId,
        node: NodeId,
        intersecting: bool,
    },

    /// Result of a `CopyToClipboard` command.
    ClipboardWritten { ok: bool },

    /// The window finished loading; `load_time_ms` is navigation start to
    /// load event end, when the host could measure it.
    Loaded { load_time_ms: Option<f64> },
}

/// A key press with the context the shortcut handler needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// The `KeyboardEvent.key` value, e.g. `"r"`, `"S"`, `"Escape"`.
    pub key: String,
    pub shift: bool,
    /// Tag name of the focused element, upper case as the DOM reports it.
    pub focus_tag: Option<String>,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift: false,
            focus_tag: None,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn focused_on(mut self, tag: impl Into<String>) -> Self {
        self.focus_tag = Some(tag.into());
        self
    }

    /// Whether focus sits in a text entry element, where shortcuts must not
    /// fire.
    pub fn is_typing(&self) -> bool {
        matches!(
            self.focus_tag.as_deref(),
            Some(tag) if tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_detection() {
        assert!(KeyInput::new("r").focused_on("INPUT").is_typing());
        assert!(KeyInput::new("r").focused_on("TEXTAREA").is_typing());
        assert!(!KeyInput::new("r").focused_on("BUTTON").is_typing());
        assert!(!KeyInput::new("r").is_typing());
    }

    #[test]
    fn host_events_deserialize_from_json() {
        let event: HostEvent =
            serde_json::from_str(r#"{"Scroll":{"y":120.5}}"#).unwrap_or(HostEvent::Scroll { y: 0.0 });
        assert_eq!(event, HostEvent::Scroll { y: 120.5 });
    }
}
