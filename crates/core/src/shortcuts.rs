use stellar_protocol::KeyInput;

use crate::toggle::Control;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Same as clicking the control's button.
    Press(Control),
    /// Reset display modes and close overlays.
    Escape,
}

/// Resolve a key press. `R`/`S` enable real orbits/sizes, with Shift they
/// reset them; keys typed into a text field are never shortcuts.
pub fn resolve(input: &KeyInput) -> Option<Shortcut> {
    if input.is_typing() {
        return None;
    }
    match input.key.as_str() {
        "r" | "R" if input.shift => Some(Shortcut::Press(Control::ResetOrbits)),
        "r" | "R" => Some(Shortcut::Press(Control::EnableOrbits)),
        "s" | "S" if input.shift => Some(Shortcut::Press(Control::ResetSize)),
        "s" | "S" => Some(Shortcut::Press(Control::EnableSize)),
        "Escape" => Some(Shortcut::Escape),
        _ => None,
    }
}

/// Help line logged at startup.
pub const HELP: &str = "Keyboard shortcuts: R (orbits), S (sizes), Shift+R/S (reset), ESC (reset all)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_keys_map_to_controls() {
        assert_eq!(resolve(&KeyInput::new("r")), Some(Shortcut::Press(Control::EnableOrbits)));
        assert_eq!(
            resolve(&KeyInput::new("R").with_shift()),
            Some(Shortcut::Press(Control::ResetOrbits))
        );
        assert_eq!(resolve(&KeyInput::new("S")), Some(Shortcut::Press(Control::EnableSize)));
        assert_eq!(
            resolve(&KeyInput::new("s").with_shift()),
            Some(Shortcut::Press(Control::ResetSize))
        );
        assert_eq!(resolve(&KeyInput::new("Escape")), Some(Shortcut::Escape));
        assert_eq!(resolve(&KeyInput::new("x")), None);
    }

    #[test]
    fn typing_in_fields_is_ignored() {
        assert_eq!(resolve(&KeyInput::new("r").focused_on("INPUT")), None);
        assert_eq!(resolve(&KeyInput::new("Escape").focused_on("TEXTAREA")), None);
    }
}
