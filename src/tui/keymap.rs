use crossterm::event::{KeyCode, KeyModifiers};

use crate::board::Transition;

// ── Actions ──────────────────────────────────────────────────────────

/// Every discrete action the board performs in response to a key press.
///
/// Actions are context-free; `App` decides what they mean for the current
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Global
    Quit,
    ShowHelp,
    Reload,
    DismissError,

    // Navigation
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,

    // Tasks
    NewTask,
    Start,
    Done,
    Back,
    Trash,
    Archive,
    Restore,
    Delete,

    // Images
    EditImage,
}

impl Action {
    /// The workflow transition this key triggers, if it is one.
    pub fn transition(self) -> Option<Transition> {
        match self {
            Action::Start => Some(Transition::Start),
            Action::Done => Some(Transition::Done),
            Action::Back => Some(Transition::Back),
            Action::Trash => Some(Transition::Trash),
            Action::Archive => Some(Transition::Archive),
            Action::Restore => Some(Transition::Restore),
            Action::Delete => Some(Transition::Delete),
            _ => None,
        }
    }
}

// ── Help categories ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpCategory {
    Navigation,
    Tasks,
    Images,
    Forms,
}

impl HelpCategory {
    fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Tasks => "Tasks",
            Self::Images => "Images",
            Self::Forms => "Forms",
        }
    }

    const ORDERED: &[Self] = &[Self::Navigation, Self::Tasks, Self::Images, Self::Forms];
}

// ── Keybinding ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: Action,
    /// Key label shown in help and the hint bar (e.g. `"s"`).
    pub label: &'static str,
    /// Shown next to the label in the help overlay; empty hides the row.
    pub description: &'static str,
    pub category: HelpCategory,
}

#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub label: &'static str,
    pub description: &'static str,
}

// ── KeyMap ────────────────────────────────────────────────────────────

/// Declarative registry of the board's key bindings.
pub struct KeyMap {
    pub bindings: Vec<KeyBinding>,
}

impl KeyMap {
    pub fn default_keymap() -> Self {
        Self {
            bindings: default_bindings(),
        }
    }

    pub fn lookup(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        // Shifted characters arrive with SHIFT set on some terminals and not
        // others. Only a lowercase letter keeps the flag meaningful.
        let modifiers = match code {
            KeyCode::Char(c) if !c.is_lowercase() => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        self.bindings
            .iter()
            .find(|kb| kb.code == code && kb.modifiers == modifiers)
            .map(|kb| kb.action)
    }

    /// The first key label bound to `action`.
    pub fn label_for(&self, action: Action) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|kb| kb.action == action && !kb.label.is_empty())
            .map(|kb| kb.label.trim())
    }

    pub fn label_for_transition(&self, transition: Transition) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|kb| kb.action.transition() == Some(transition) && !kb.label.is_empty())
            .map(|kb| kb.label.trim())
    }

    /// Grouped help rows in display order. Form keys are modal-internal and
    /// listed here by hand.
    pub fn help_entries(&self) -> Vec<(&'static str, Vec<HelpEntry>)> {
        let mut out = Vec::new();

        for &cat in HelpCategory::ORDERED {
            let mut entries: Vec<HelpEntry> = self
                .bindings
                .iter()
                .filter(|kb| kb.category == cat && !kb.description.is_empty())
                .map(|kb| HelpEntry {
                    label: kb.label,
                    description: kb.description,
                })
                .collect();

            if cat == HelpCategory::Forms {
                entries.extend([
                    HelpEntry {
                        label: "  Tab",
                        description: "Next field",
                    },
                    HelpEntry {
                        label: "  Enter",
                        description: "Create task / load file / save image",
                    },
                    HelpEntry {
                        label: "  Esc",
                        description: "Leave form / cancel image edit",
                    },
                ]);
            }

            if !entries.is_empty() {
                out.push((cat.label(), entries));
            }
        }

        out
    }
}

// ── Default bindings ─────────────────────────────────────────────────

#[allow(clippy::enum_glob_use)]
fn default_bindings() -> Vec<KeyBinding> {
    use Action::*;
    use HelpCategory::*;

    let bind = |code: KeyCode,
                action: Action,
                label: &'static str,
                description: &'static str,
                category: HelpCategory| KeyBinding {
        code,
        modifiers: KeyModifiers::NONE,
        action,
        label,
        description,
        category,
    };

    vec![
        // ── Navigation ───────────────────────────────────────────
        bind(KeyCode::Char('h'), MoveLeft, "  h/l", "Previous / next column", Navigation),
        bind(KeyCode::Left, MoveLeft, "", "", Navigation),
        bind(KeyCode::Char('l'), MoveRight, "", "", Navigation),
        bind(KeyCode::Right, MoveRight, "", "", Navigation),
        bind(KeyCode::Char('k'), MoveUp, "  j/k", "Previous / next task", Navigation),
        bind(KeyCode::Up, MoveUp, "", "", Navigation),
        bind(KeyCode::Char('j'), MoveDown, "", "", Navigation),
        bind(KeyCode::Down, MoveDown, "", "", Navigation),
        bind(KeyCode::Char('R'), Reload, "  R", "Reload tasks", Navigation),
        bind(KeyCode::Esc, DismissError, "  Esc", "Dismiss error", Navigation),
        bind(KeyCode::Char('?'), ShowHelp, "  ?", "Toggle help", Navigation),
        bind(KeyCode::Char('q'), Quit, "  q", "Quit", Navigation),
        KeyBinding {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            action: Quit,
            label: "",
            description: "",
            category: Navigation,
        },
        // ── Tasks ────────────────────────────────────────────────
        bind(KeyCode::Char('n'), NewTask, "  n", "New task", Tasks),
        bind(KeyCode::Char('s'), Start, "  s", "Start", Tasks),
        bind(KeyCode::Char('d'), Done, "  d", "Done", Tasks),
        bind(KeyCode::Char('b'), Back, "  b", "Back", Tasks),
        bind(KeyCode::Char('t'), Trash, "  t", "Trash", Tasks),
        bind(KeyCode::Char('a'), Archive, "  a", "Archive", Tasks),
        bind(KeyCode::Char('r'), Restore, "  r", "Restore", Tasks),
        bind(KeyCode::Char('x'), Delete, "  x", "Delete permanently", Tasks),
        // ── Images ───────────────────────────────────────────────
        bind(KeyCode::Char('i'), EditImage, "  i", "Add / change image", Images),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_transition_keys() {
        let km = KeyMap::default_keymap();
        assert_eq!(
            km.lookup(KeyCode::Char('s'), KeyModifiers::NONE),
            Some(Action::Start)
        );
        assert_eq!(
            km.lookup(KeyCode::Char('x'), KeyModifiers::NONE),
            Some(Action::Delete)
        );
        assert_eq!(
            km.lookup(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
    }

    #[test]
    fn shifted_reload_matches_with_or_without_shift_flag() {
        let km = KeyMap::default_keymap();
        assert_eq!(
            km.lookup(KeyCode::Char('R'), KeyModifiers::SHIFT),
            Some(Action::Reload)
        );
        assert_eq!(
            km.lookup(KeyCode::Char('R'), KeyModifiers::NONE),
            Some(Action::Reload)
        );
        assert_eq!(
            km.lookup(KeyCode::Char('r'), KeyModifiers::NONE),
            Some(Action::Restore)
        );
    }

    #[test]
    fn shifted_symbols_ignore_the_shift_flag() {
        let km = KeyMap::default_keymap();
        assert_eq!(
            km.lookup(KeyCode::Char('?'), KeyModifiers::SHIFT),
            Some(Action::ShowHelp)
        );
        assert_eq!(
            km.lookup(KeyCode::Char('?'), KeyModifiers::NONE),
            Some(Action::ShowHelp)
        );
        assert_eq!(km.lookup(KeyCode::Char('?'), KeyModifiers::CONTROL), None);
    }

    #[test]
    fn unknown_key_has_no_action() {
        let km = KeyMap::default_keymap();
        assert_eq!(km.lookup(KeyCode::Char('z'), KeyModifiers::NONE), None);
    }

    #[test]
    fn every_transition_has_a_key() {
        let km = KeyMap::default_keymap();
        for transition in Transition::ALL {
            let bound = km
                .bindings
                .iter()
                .any(|kb| kb.action.transition() == Some(transition));
            assert!(bound, "no key for {transition}");
        }
    }

    #[test]
    fn label_for_trims_padding() {
        let km = KeyMap::default_keymap();
        assert_eq!(km.label_for(Action::Archive), Some("a"));
        assert_eq!(km.label_for(Action::MoveRight), None);
        assert_eq!(km.label_for_transition(Transition::Delete), Some("x"));
    }

    #[test]
    fn help_entries_cover_all_categories_without_duplicates() {
        let km = KeyMap::default_keymap();
        let entries = km.help_entries();
        let labels: Vec<&str> = entries.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Navigation", "Tasks", "Images", "Forms"]);
        for (_, entries) in entries {
            let mut seen = std::collections::HashSet::new();
            for e in &entries {
                assert!(seen.insert(e.label), "duplicate help label: {:?}", e.label);
            }
        }
    }
}
