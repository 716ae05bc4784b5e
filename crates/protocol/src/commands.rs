use serde::{Deserialize, Serialize};

use crate::class::ClassName;
use crate::shared_str::SharedStr;
use crate::types::{InsertPosition, NodeId, ObserveOptions, ObserverId, StyleProperty, Tag, ToneSpec};

/// A single, stateless DOM instruction.
///
/// The core emits a `Vec<DomCommand>` after every host event, timer or
/// frame. Hosts apply the list in order; each command carries all the data it
/// needs. Commands that target a node the host no longer knows are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomCommand {
    /// Create an element and insert it under `parent`. `node` is the id the
    /// core will use to refer to it from now on.
    CreateElement {
        node: NodeId,
        parent: NodeId,
        position: InsertPosition,
        tag: Tag,
        class: Option<ClassName>,
        text: Option<SharedStr>,
        styles: Vec<(StyleProperty, SharedStr)>,
        attributes: Vec<(SharedStr, SharedStr)>,
    },

    /// Detach an element from the document.
    Remove { node: NodeId },

    AddClass { node: NodeId, class: ClassName },

    RemoveClass { node: NodeId, class: ClassName },

    /// Set one inline style property. An empty value clears it.
    SetStyle {
        node: NodeId,
        property: StyleProperty,
        value: SharedStr,
    },

    /// Replace the element's text content.
    SetText { node: NodeId, text: SharedStr },

    SetAttribute {
        node: NodeId,
        name: SharedStr,
        value: SharedStr,
    },

    SetDisabled { node: NodeId, disabled: bool },

    /// Reset every field of a form element.
    ResetForm { node: NodeId },

    /// Start reporting viewport intersections for `node` through `observer`.
    Observe {
        node: NodeId,
        observer: ObserverId,
        options: ObserveOptions,
    },

    /// Stop `observer` reporting intersections for `node`. Other observers
    /// watching the same node are unaffected.
    Unobserve { node: NodeId, observer: ObserverId },

    /// Smoothly scroll `node` to the top of the viewport.
    ScrollIntoView { node: NodeId },

    /// Smoothly scroll the window to a vertical offset.
    ScrollTo { top: f64 },

    /// Open the print dialog.
    Print,

    /// Write text to the clipboard; the host reports the outcome with
    /// `HostEvent::ClipboardWritten`.
    CopyToClipboard { text: SharedStr },

    /// Best-effort sound effect. Hosts swallow audio failures.
    PlayTone(ToneSpec),
}

impl DomCommand {
    pub fn style(node: NodeId, property: StyleProperty, value: impl Into<SharedStr>) -> Self {
        DomCommand::SetStyle {
            node,
            property,
            value: value.into(),
        }
    }

    pub fn text(node: NodeId, text: impl Into<SharedStr>) -> Self {
        DomCommand::SetText {
            node,
            text: text.into(),
        }
    }

    /// The node this command targets, if any.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            DomCommand::CreateElement { node, .. }
            | DomCommand::Remove { node }
            | DomCommand::AddClass { node, .. }
            | DomCommand::RemoveClass { node, .. }
            | DomCommand::SetStyle { node, .. }
            | DomCommand::SetText { node, .. }
            | DomCommand::SetAttribute { node, .. }
            | DomCommand::SetDisabled { node, .. }
            | DomCommand::ResetForm { node }
            | DomCommand::Observe { node, .. }
            | DomCommand::Unobserve { node, .. }
            | DomCommand::ScrollIntoView { node } => Some(*node),
            DomCommand::ScrollTo { .. }
            | DomCommand::Print
            | DomCommand::CopyToClipboard { .. }
            | DomCommand::PlayTone(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_as_tagged_json() {
        let cmd = DomCommand::AddClass {
            node: NodeId(3),
            class: ClassName::RealSize,
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert_eq!(json, r#"{"AddClass":{"node":3,"class":"RealSize"}}"#);
    }

    #[test]
    fn window_level_commands_have_no_target() {
        assert_eq!(DomCommand::Print.target(), None);
        assert_eq!(DomCommand::ScrollTo { top: 0.0 }.target(), None);
        assert_eq!(
            DomCommand::style(NodeId(9), StyleProperty::Opacity, "1").target(),
            Some(NodeId(9))
        );
    }

    #[test]
    fn unobserve_names_its_observer() {
        let cmd = DomCommand::Unobserve {
            node: NodeId(4),
            observer: ObserverId(1),
        };
        assert_eq!(cmd.target(), Some(NodeId(4)));
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert_eq!(json, r#"{"Unobserve":{"node":4,"observer":1}}"#);
    }
}
