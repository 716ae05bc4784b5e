use stellar_protocol::{ClassName, DomCommand, NodeId};
use tracing::debug;

use crate::config::EscapeScope;

/// Presentation modes applied as classes on the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    RealSize,
    RealOrbits,
    RedGiant,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [
        DisplayMode::RealSize,
        DisplayMode::RealOrbits,
        DisplayMode::RedGiant,
    ];

    pub fn class(self) -> ClassName {
        match self {
            DisplayMode::RealSize => ClassName::RealSize,
            DisplayMode::RealOrbits => ClassName::RealOrbits,
            DisplayMode::RedGiant => ClassName::RedGiantMode,
        }
    }
}

/// Independent on/off flags, one per [`DisplayMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayModeSet {
    real_size: bool,
    real_orbits: bool,
    red_giant: bool,
}

impl DisplayModeSet {
    pub fn is_active(&self, mode: DisplayMode) -> bool {
        match mode {
            DisplayMode::RealSize => self.real_size,
            DisplayMode::RealOrbits => self.real_orbits,
            DisplayMode::RedGiant => self.red_giant,
        }
    }

    /// Returns whether the flag changed.
    pub fn set(&mut self, mode: DisplayMode, active: bool) -> bool {
        let slot = match mode {
            DisplayMode::RealSize => &mut self.real_size,
            DisplayMode::RealOrbits => &mut self.real_orbits,
            DisplayMode::RedGiant => &mut self.red_giant,
        };
        let changed = *slot != active;
        *slot = active;
        changed
    }

    pub fn active(&self) -> impl Iterator<Item = DisplayMode> + '_ {
        DisplayMode::ALL
            .into_iter()
            .filter(move |m| self.is_active(*m))
    }
}

/// The toggle buttons on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    EnableSize,
    ResetSize,
    EnableOrbits,
    ResetOrbits,
    ToggleRedGiant,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::EnableSize,
        Control::ResetSize,
        Control::EnableOrbits,
        Control::ResetOrbits,
        Control::ToggleRedGiant,
    ];

    /// The `id` attribute of the button in the page markup.
    pub fn element_id(self) -> &'static str {
        match self {
            Control::EnableSize => "btn-real-size",
            Control::ResetSize => "btn-reset-size",
            Control::EnableOrbits => "btn-real-orbits",
            Control::ResetOrbits => "btn-reset-orbits",
            Control::ToggleRedGiant => "btn-red-giant",
        }
    }
}

/// Outcome of a control press, for the caller to announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub mode: DisplayMode,
    pub active: bool,
    pub message: &'static str,
}

impl Transition {
    /// The red giant easter egg just switched on.
    pub fn is_red_giant_onset(&self) -> bool {
        self.mode == DisplayMode::RedGiant && self.active
    }
}

/// Maps button presses and the Escape key onto display-mode flags.
///
/// Pressing a control whose button is missing from the page does nothing,
/// so keyboard shortcuts disappear together with their buttons.
#[derive(Debug)]
pub struct TogglePanel {
    body: NodeId,
    controls: Vec<(Control, NodeId)>,
    modes: DisplayModeSet,
    escape_scope: EscapeScope,
}

impl TogglePanel {
    pub fn new(body: NodeId, controls: Vec<(Control, NodeId)>, escape_scope: EscapeScope) -> Self {
        Self {
            body,
            controls,
            modes: DisplayModeSet::default(),
            escape_scope,
        }
    }

    pub fn controls(&self) -> &[(Control, NodeId)] {
        &self.controls
    }

    pub fn has_control(&self, control: Control) -> bool {
        self.controls.iter().any(|(c, _)| *c == control)
    }

    pub fn modes(&self) -> DisplayModeSet {
        self.modes
    }

    /// Press `control` if its button exists on the page.
    pub fn press(&mut self, control: Control, out: &mut Vec<DomCommand>) -> Option<Transition> {
        if !self.has_control(control) {
            debug!(?control, "Control not on page");
            return None;
        }
        Some(self.apply(control, out))
    }

    fn apply(&mut self, control: Control, out: &mut Vec<DomCommand>) -> Transition {
        let (mode, active, message) = match control {
            Control::EnableSize => (DisplayMode::RealSize, true, "Real planet sizes enabled"),
            Control::ResetSize => (DisplayMode::RealSize, false, "Planet sizes adjusted"),
            Control::EnableOrbits => (DisplayMode::RealOrbits, true, "Real orbit distances enabled"),
            Control::ResetOrbits => (DisplayMode::RealOrbits, false, "Orbit distances adjusted"),
            Control::ToggleRedGiant => {
                if self.modes.is_active(DisplayMode::RedGiant) {
                    (DisplayMode::RedGiant, false, "Sun returned to normal")
                } else {
                    (DisplayMode::RedGiant, true, "☀️ The Sun has become a red giant!")
                }
            }
        };
        self.set(mode, active, out);
        Transition {
            mode,
            active,
            message,
        }
    }

    fn set(&mut self, mode: DisplayMode, active: bool, out: &mut Vec<DomCommand>) {
        if !self.modes.set(mode, active) {
            return;
        }
        let node = self.body;
        let class = mode.class();
        out.push(if active {
            DomCommand::AddClass { node, class }
        } else {
            DomCommand::RemoveClass { node, class }
        });
    }

    /// Escape key. Returns the announcement, if the configured scope makes
    /// one.
    pub fn escape(&mut self, out: &mut Vec<DomCommand>) -> Option<&'static str> {
        match self.escape_scope {
            EscapeScope::AllModes => {
                for mode in DisplayMode::ALL {
                    self.set(mode, false, out);
                }
                Some("All modes reset")
            }
            EscapeScope::RedGiantOnly => {
                self.set(DisplayMode::RedGiant, false, out);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BODY: NodeId = NodeId(1);

    fn panel(scope: EscapeScope) -> TogglePanel {
        let controls = Control::ALL
            .iter()
            .zip(10..)
            .map(|(c, id)| (*c, NodeId(id)))
            .collect();
        TogglePanel::new(BODY, controls, scope)
    }

    #[test]
    fn independent_modes() {
        let mut panel = panel(EscapeScope::AllModes);
        let mut out = Vec::new();
        panel.press(Control::EnableSize, &mut out);
        panel.press(Control::EnableOrbits, &mut out);
        panel.press(Control::ResetSize, &mut out);

        let modes = panel.modes();
        assert!(!modes.is_active(DisplayMode::RealSize));
        assert!(modes.is_active(DisplayMode::RealOrbits));
        assert!(!modes.is_active(DisplayMode::RedGiant));
        assert_eq!(
            out,
            vec![
                DomCommand::AddClass { node: BODY, class: ClassName::RealSize },
                DomCommand::AddClass { node: BODY, class: ClassName::RealOrbits },
                DomCommand::RemoveClass { node: BODY, class: ClassName::RealSize },
            ]
        );
    }

    #[test]
    fn repeated_enable_is_idempotent() {
        let mut panel = panel(EscapeScope::AllModes);
        let mut out = Vec::new();
        let first = panel.press(Control::EnableSize, &mut out);
        let second = panel.press(Control::EnableSize, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(first.map(|t| t.message), Some("Real planet sizes enabled"));
        assert_eq!(second.map(|t| t.active), Some(true));
    }

    #[test]
    fn red_giant_toggles_only_itself() {
        let mut panel = panel(EscapeScope::AllModes);
        let mut out = Vec::new();
        panel.press(Control::EnableOrbits, &mut out);

        let on = panel.press(Control::ToggleRedGiant, &mut out);
        assert!(on.is_some_and(|t| t.is_red_giant_onset()));
        assert!(panel.modes().is_active(DisplayMode::RealOrbits));

        let off = panel.press(Control::ToggleRedGiant, &mut out);
        assert_eq!(off.map(|t| t.message), Some("Sun returned to normal"));
        assert!(!panel.modes().is_active(DisplayMode::RedGiant));
        assert!(panel.modes().is_active(DisplayMode::RealOrbits));
    }

    #[test]
    fn escape_resets_everything_by_default() {
        let mut panel = panel(EscapeScope::AllModes);
        let mut out = Vec::new();
        panel.press(Control::EnableSize, &mut out);
        panel.press(Control::ToggleRedGiant, &mut out);
        out.clear();

        assert_eq!(panel.escape(&mut out), Some("All modes reset"));
        assert_eq!(panel.modes().active().count(), 0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn escape_can_be_limited_to_red_giant() {
        let mut panel = panel(EscapeScope::RedGiantOnly);
        let mut out = Vec::new();
        panel.press(Control::EnableSize, &mut out);
        panel.press(Control::ToggleRedGiant, &mut out);

        assert_eq!(panel.escape(&mut out), None);
        let active: Vec<_> = panel.modes().active().collect();
        assert_eq!(active, vec![DisplayMode::RealSize]);
    }

    #[test]
    fn missing_button_disables_control() {
        let mut panel = TogglePanel::new(BODY, vec![(Control::EnableSize, NodeId(2))], EscapeScope::AllModes);
        let mut out = Vec::new();
        assert!(panel.press(Control::EnableOrbits, &mut out).is_none());
        assert!(out.is_empty());
        assert!(panel.press(Control::EnableSize, &mut out).is_some());
    }
}
