//! Keyboard shortcut mapping.
//!
//! The selection editor recognizes very few keys: Delete / Backspace removes
//! the focused region and Escape drops focus. Everything else is left to
//! the host page.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Delete the focused region with its handles and connectors.
    DeleteRegion,
    /// Hide the focused region's handles.
    Deselect,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// Returns `None` for unbound keys and for any combo with Ctrl / Meta
    /// held, which belong to the browser.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.ctrl || modifiers.meta {
            return None;
        }
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteRegion),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_keys() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE),
            Some(ShortcutAction::DeleteRegion)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::SHIFT),
            Some(ShortcutAction::DeleteRegion)
        );
    }

    #[test]
    fn escape_deselects() {
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn other_keys_are_ignored() {
        assert_eq!(ShortcutMap::resolve("a", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("Enter", Modifiers::NONE), None);
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("Backspace", cmd), None);
    }
}
