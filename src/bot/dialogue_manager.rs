//! Dialogue Manager module for handling dialogue state transitions
//!
//! [`route`] is the conversation router: given the current session and an
//! inbound event it updates the session in place and returns the screen to
//! show. Navigation buttons (menu, order, info, specialist, manager, decline)
//! work from every state and are checked first; every other button is only
//! accepted on the screen that offers it.

use std::future::Future;
use tracing::{debug, info};

use crate::catalog::{self, DeclineReason};
use crate::command::{BackTarget, Command, Inbound};
use crate::dialogue::{CapturedField, DialogueState, OrderDraft, Session};
use crate::session::{SessionId, SessionStore};

use super::ui_builder::{self, Screen};

/// Contact request or order collected from a finished flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lead {
    Order(OrderDraft),
    Specialist { note: String, phone: String },
    Manager { topic: String, phone: String },
    DeclineFeedback(String),
}

/// Result of routing one event
#[derive(Debug, Clone)]
pub struct Transition {
    pub screen: Screen,
    pub lead: Option<Lead>,
}

impl From<Screen> for Transition {
    fn from(screen: Screen) -> Self {
        Self { screen, lead: None }
    }
}

/// Route an event, mutating the session
///
/// Returns `None` when the event is not handled here: a button that does not
/// belong to the current screen or carries an id outside the catalogs. The
/// session is left untouched in that case.
pub fn route(session: &mut Session, event: &Inbound) -> Option<Transition> {
    let language_code = session.language_code.clone();
    let language_code = language_code.as_deref();

    match event {
        Inbound::Start => {
            session.state = DialogueState::Menu;
            Some(ui_builder::greeting(language_code).into())
        }
        Inbound::Button(command) => global_transition(session, command, language_code)
            .or_else(|| screen_transition(session, command, language_code)),
        Inbound::Text(text) => Some(text_transition(session, text, language_code)),
    }
}

fn global_transition(
    session: &mut Session,
    command: &Command,
    language_code: Option<&str>,
) -> Option<Transition> {
    let (next, screen) = match command {
        Command::Menu => (DialogueState::Menu, ui_builder::main_menu(language_code)),
        Command::Order => {
            session.draft = OrderDraft::default();
            (DialogueState::OrderStyle, ui_builder::style_picker(language_code))
        }
        Command::Info => (DialogueState::InfoTopic, ui_builder::info_intro(language_code)),
        Command::Specialist => (
            DialogueState::SpecialistDetails,
            ui_builder::prompt("specialist-prompt", language_code),
        ),
        Command::Manager => (
            DialogueState::ManagerTopic,
            ui_builder::prompt("manager-prompt", language_code),
        ),
        Command::Decline => (
            DialogueState::DeclineReason,
            ui_builder::decline_reasons(language_code),
        ),
        _ => return None,
    };

    session.state = next;
    Some(screen.into())
}

fn screen_transition(
    session: &mut Session,
    command: &Command,
    language_code: Option<&str>,
) -> Option<Transition> {
    use DialogueState as S;

    let draft = &mut session.draft;
    let mut lead = None;

    let (next, screen) = match (session.state, command) {
        (S::OrderStyle, Command::Style(id)) if catalog::is_style(id) => {
            draft.style = Some(id.clone());
            (S::OrderMaterial, ui_builder::material_picker(language_code))
        }
        (S::OrderMaterial, Command::Material(id)) if catalog::material(id).is_some() => {
            draft.material = Some(id.clone());
            (S::OrderColor, ui_builder::color_picker(id, language_code))
        }
        (S::OrderColor, Command::Color { material, color })
            if catalog::is_color_of(material, color) =>
        {
            draft.material = Some(material.clone());
            draft.color = Some(color.clone());
            (S::OrderInsert, ui_builder::insert_picker(language_code))
        }
        (S::OrderInsert, Command::Insert(id)) if catalog::insert_type(id).is_some() => {
            draft.insert = Some(id.clone());
            (S::OrderOptions, ui_builder::options_picker(draft, language_code))
        }
        (S::OrderOptions, Command::ToggleOption(id)) if catalog::is_option(id) => {
            draft.toggle_option(id);
            (S::OrderOptions, ui_builder::options_picker(draft, language_code))
        }
        (S::OrderOptions, Command::ClearOptions) => {
            draft.options.clear();
            (S::OrderOptions, ui_builder::options_picker(draft, language_code))
        }
        (S::OrderOptions, Command::OptionsDone) => {
            (S::OrderPayment, ui_builder::payment_picker(language_code))
        }
        (S::OrderPayment, Command::Payment(id)) if catalog::payment(id).is_some() => {
            draft.payment = Some(id.clone());
            (S::OrderConfirm, ui_builder::order_summary(draft, language_code))
        }
        (S::OrderConfirm, Command::Confirm) => {
            lead = Some(Lead::Order(draft.clone()));
            (
                S::Menu,
                ui_builder::closing_with_menu("order-thanks", language_code),
            )
        }
        (S::InfoTopic, Command::Topic(id)) => {
            let topic = catalog::info_topic(id)?;
            (S::InfoTopic, ui_builder::info_topic(topic, language_code))
        }
        (S::DeclineReason, Command::Reason(reason)) => match reason {
            DeclineReason::Expensive => (S::Menu, ui_builder::discount_offer(language_code)),
            DeclineReason::Missing => (
                S::SpecialistDetails,
                ui_builder::prompt("decline-missing-prompt", language_code),
            ),
            DeclineReason::Browsing => (S::InfoTopic, ui_builder::browsing_topics(language_code)),
            DeclineReason::Other => (
                S::DeclineOther,
                ui_builder::prompt("decline-other-prompt", language_code),
            ),
        },
        (state, Command::Back(target)) if back_origin(*target) == state => {
            back_transition(*target, draft, language_code)
        }
        _ => return None,
    };

    session.state = next;
    Some(Transition { screen, lead })
}

/// Screen that shows the back button leading to `target`
fn back_origin(target: BackTarget) -> DialogueState {
    match target {
        BackTarget::Style => DialogueState::OrderMaterial,
        BackTarget::Material => DialogueState::OrderColor,
        BackTarget::Color => DialogueState::OrderInsert,
        BackTarget::Insert => DialogueState::OrderOptions,
        BackTarget::Options => DialogueState::OrderPayment,
        BackTarget::Payment => DialogueState::OrderConfirm,
    }
}

/// Re-render an earlier wizard step from the draft, leaving the draft as is
fn back_transition(
    target: BackTarget,
    draft: &OrderDraft,
    language_code: Option<&str>,
) -> (DialogueState, Screen) {
    match target {
        BackTarget::Style => (DialogueState::OrderStyle, ui_builder::style_picker(language_code)),
        BackTarget::Material => (
            DialogueState::OrderMaterial,
            ui_builder::material_picker(language_code),
        ),
        BackTarget::Color => (
            DialogueState::OrderColor,
            ui_builder::color_picker(draft.material.as_deref().unwrap_or_default(), language_code),
        ),
        BackTarget::Insert => (
            DialogueState::OrderInsert,
            ui_builder::insert_picker(language_code),
        ),
        BackTarget::Options => (
            DialogueState::OrderOptions,
            ui_builder::options_picker(draft, language_code),
        ),
        BackTarget::Payment => (
            DialogueState::OrderPayment,
            ui_builder::payment_picker(language_code),
        ),
    }
}

fn text_transition(session: &mut Session, text: &str, language_code: Option<&str>) -> Transition {
    let text = text.trim();
    if text.is_empty() {
        return ui_builder::prompt("fallback", language_code).into();
    }

    let mut capture = |field: CapturedField| {
        session.captured.insert(field, text.to_string());
    };

    let (next, screen, lead) = match session.state {
        DialogueState::SpecialistDetails => {
            capture(CapturedField::SpecialistNote);
            (
                DialogueState::SpecialistPhone,
                ui_builder::prompt("phone-prompt", language_code),
                None,
            )
        }
        DialogueState::SpecialistPhone => {
            capture(CapturedField::SpecialistPhone);
            let lead = Lead::Specialist {
                note: session
                    .captured(CapturedField::SpecialistNote)
                    .unwrap_or_default()
                    .to_string(),
                phone: text.to_string(),
            };
            (
                DialogueState::Menu,
                ui_builder::closing_with_menu("specialist-thanks", language_code),
                Some(lead),
            )
        }
        DialogueState::ManagerTopic => {
            capture(CapturedField::ManagerTopic);
            (
                DialogueState::ManagerPhone,
                ui_builder::prompt("phone-prompt", language_code),
                None,
            )
        }
        DialogueState::ManagerPhone => {
            capture(CapturedField::ManagerPhone);
            let lead = Lead::Manager {
                topic: session
                    .captured(CapturedField::ManagerTopic)
                    .unwrap_or_default()
                    .to_string(),
                phone: text.to_string(),
            };
            (
                DialogueState::Menu,
                ui_builder::closing_with_menu("manager-thanks", language_code),
                Some(lead),
            )
        }
        DialogueState::DeclineOther => {
            capture(CapturedField::DeclineOther);
            (
                DialogueState::Menu,
                ui_builder::closing_with_menu("decline-other-thanks", language_code),
                Some(Lead::DeclineFeedback(text.to_string())),
            )
        }
        _ => return ui_builder::prompt("fallback", language_code).into(),
    };

    session.state = next;
    Transition { screen, lead }
}

/// Run one event against the stored session of `session_id`
///
/// Same as [`process_event_with_reply`] without delivering the screen.
pub async fn process_event(
    sessions: &dyn SessionStore,
    session_id: SessionId,
    language_code: Option<&str>,
    event: &Inbound,
) -> Option<Transition> {
    process_event_with_reply(sessions, session_id, language_code, event, |_| async {}).await
}

/// Run one event and deliver the resulting screen under the session lock
///
/// The lock is held until `deliver` completes, so for events of the same user
/// both the state changes and the replies reach Telegram in arrival order.
/// An event that is not handled leaves the session untouched, including its
/// language code.
pub async fn process_event_with_reply<F, Fut>(
    sessions: &dyn SessionStore,
    session_id: SessionId,
    language_code: Option<&str>,
    event: &Inbound,
    deliver: F,
) -> Option<Transition>
where
    F: FnOnce(Screen) -> Fut,
    Fut: Future<Output = ()>,
{
    let handle = sessions.get_or_create(session_id).await;
    let mut session = handle.lock().await;

    let previous_language =
        language_code.map(|code| session.language_code.replace(code.to_string()));
    let previous = session.state;
    let transition = route(&mut session, event);

    match &transition {
        Some(transition) => {
            debug!(
                user_id = session_id,
                from = ?previous,
                to = ?session.state,
                "Dialogue transition"
            );
            if let Some(lead) = &transition.lead {
                log_lead(session_id, lead);
            }
            deliver(transition.screen.clone()).await;
        }
        None => {
            if let Some(language) = previous_language {
                session.language_code = language;
            }
            debug!(user_id = session_id, state = ?previous, event = ?event, "Event not handled in current state");
        }
    }

    transition
}

fn log_lead(session_id: SessionId, lead: &Lead) {
    match lead {
        Lead::Order(draft) => info!(
            user_id = session_id,
            style = ?draft.style,
            material = ?draft.material,
            color = ?draft.color,
            insert = ?draft.insert,
            options = ?draft.options,
            payment = ?draft.payment,
            "Order confirmed"
        ),
        Lead::Specialist { note, phone } => info!(
            user_id = session_id,
            note = %note,
            phone = %phone,
            "Specialist consultation requested"
        ),
        Lead::Manager { topic, phone } => info!(
            user_id = session_id,
            topic = %topic,
            phone = %phone,
            "Manager callback requested"
        ),
        Lead::DeclineFeedback(text) => info!(
            user_id = session_id,
            reason = %text,
            "Decline feedback received"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(session: &mut Session, token: &str) -> Option<Transition> {
        let command = token.parse::<Command>().unwrap();
        route(session, &Inbound::Button(command))
    }

    fn at(state: DialogueState) -> Session {
        Session {
            state,
            ..Default::default()
        }
    }

    #[test]
    fn test_out_of_place_button_is_not_handled() {
        let mut session = at(DialogueState::Menu);
        assert!(button(&mut session, "AUTO:STYLE:5").is_none());
        assert!(button(&mut session, "AUTO:CONFIRM").is_none());
        assert!(button(&mut session, "AUTO:BACK:STYLE").is_none());
        assert_eq!(session.state, DialogueState::Menu);
        assert_eq!(session.draft, OrderDraft::default());
    }

    #[test]
    fn test_unknown_catalog_ids_are_not_handled() {
        let mut session = at(DialogueState::OrderStyle);
        assert!(button(&mut session, "AUTO:STYLE:23").is_none());
        assert_eq!(session.state, DialogueState::OrderStyle);

        let mut session = at(DialogueState::OrderColor);
        assert!(button(&mut session, "AUTO:COLOR:canyon:9").is_none());
        assert!(session.draft.color.is_none());
    }

    #[test]
    fn test_color_overrides_material() {
        let mut session = at(DialogueState::OrderColor);
        session.draft.material = Some("oregon".to_string());

        button(&mut session, "AUTO:COLOR:dakota:3").unwrap();

        assert_eq!(session.draft.material.as_deref(), Some("dakota"));
        assert_eq!(session.draft.color.as_deref(), Some("3"));
        assert_eq!(session.state, DialogueState::OrderInsert);
    }

    #[test]
    fn test_empty_text_gets_fallback_without_capture() {
        let mut session = at(DialogueState::SpecialistDetails);
        let transition = route(&mut session, &Inbound::Text("   ".to_string())).unwrap();
        assert!(transition.screen.text.contains("/start"));
        assert_eq!(session.state, DialogueState::SpecialistDetails);
        assert!(session.captured.is_empty());
    }
}
