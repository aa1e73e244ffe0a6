//! Conversation state kept for every user talking to the bot.

use std::collections::{BTreeSet, HashMap};

/// Screen the user is currently facing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DialogueState {
    #[default]
    Menu,
    OrderStyle,
    OrderMaterial,
    OrderColor,
    OrderInsert,
    OrderOptions,
    OrderPayment,
    OrderConfirm,
    SpecialistDetails,
    SpecialistPhone,
    InfoTopic,
    ManagerTopic,
    ManagerPhone,
    DeclineReason,
    DeclineOther,
}

/// Order configuration assembled across the wizard steps
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub style: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub insert: Option<String>,
    pub options: BTreeSet<String>,
    pub payment: Option<String>,
}

impl OrderDraft {
    /// Add the option if absent, remove it otherwise
    pub fn toggle_option(&mut self, option: &str) {
        if !self.options.remove(option) {
            self.options.insert(option.to_string());
        }
    }
}

/// Free-form answers collected by the text prompts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapturedField {
    SpecialistNote,
    SpecialistPhone,
    ManagerTopic,
    ManagerPhone,
    DeclineOther,
}

/// Per-user conversational context
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub state: DialogueState,
    pub draft: OrderDraft,
    pub captured: HashMap<CapturedField, String>,
    /// Telegram language code of the last update, used to pick the locale
    pub language_code: Option<String>,
}

impl Session {
    pub fn captured(&self, field: CapturedField) -> Option<&str> {
        self.captured.get(&field).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_at_menu() {
        let session = Session::default();
        assert_eq!(session.state, DialogueState::Menu);
        assert_eq!(session.draft, OrderDraft::default());
        assert!(session.captured.is_empty());
    }

    #[test]
    fn test_toggle_option_twice_restores_set() {
        let mut draft = OrderDraft::default();
        draft.toggle_option("2");
        let before = draft.options.clone();

        draft.toggle_option("5");
        draft.toggle_option("5");

        assert_eq!(draft.options, before);
    }
}
