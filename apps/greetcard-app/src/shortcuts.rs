use serde::{Deserialize, Serialize};

/// A key press with its modifiers, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn primary(&self) -> bool {
        (self.ctrl || self.meta) && !self.alt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorShortcut {
    Undo,
    Redo,
}

/// Undo is primary+Z; redo is primary+Y or primary+Shift+Z.
pub fn match_shortcut(chord: &KeyChord) -> Option<EditorShortcut> {
    if !chord.primary() {
        return None;
    }
    match chord.key.to_ascii_lowercase().as_str() {
        "z" if chord.shift => Some(EditorShortcut::Redo),
        "z" => Some(EditorShortcut::Undo),
        "y" if !chord.shift => Some(EditorShortcut::Redo),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_chords() {
        assert_eq!(match_shortcut(&KeyChord::new("z").ctrl()), Some(EditorShortcut::Undo));
        assert_eq!(match_shortcut(&KeyChord::new("z").meta()), Some(EditorShortcut::Undo));
        assert_eq!(match_shortcut(&KeyChord::new("y").ctrl()), Some(EditorShortcut::Redo));
        assert_eq!(match_shortcut(&KeyChord::new("Z").meta().shift()), Some(EditorShortcut::Redo));
    }

    #[test]
    fn test_unbound_chords() {
        assert_eq!(match_shortcut(&KeyChord::new("z")), None);
        assert_eq!(match_shortcut(&KeyChord::new("x").ctrl()), None);
        let mut alt = KeyChord::new("z").ctrl();
        alt.alt = true;
        assert_eq!(match_shortcut(&alt), None);
    }
}
