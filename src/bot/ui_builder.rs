//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::catalog::{self, DeclineReason, Entry};
use crate::command::{BackTarget, Command};
use crate::dialogue::OrderDraft;
use crate::localization::{t_args_lang, t_lang};

/// Buttons per row in the style and color grids
const GRID_WIDTH: usize = 3;

/// Text of a screen together with its inline keyboard, if any
#[derive(Debug, Clone)]
pub struct Screen {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Screen {
    fn new(text: String, rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            text,
            keyboard: Some(InlineKeyboardMarkup::new(rows)),
        }
    }

    fn text_only(text: String) -> Self {
        Self {
            text,
            keyboard: None,
        }
    }
}

fn button(label: String, command: Command) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, command.token())
}

fn single(label: String, command: Command) -> Vec<InlineKeyboardButton> {
    vec![button(label, command)]
}

fn specialist_row(language_code: Option<&str>) -> Vec<InlineKeyboardButton> {
    single(
        t_lang("button-specialist-help", language_code),
        Command::Specialist,
    )
}

fn back_row(target: BackTarget, language_code: Option<&str>) -> Vec<InlineKeyboardButton> {
    single(t_lang("button-back", language_code), Command::Back(target))
}

fn home_row(language_code: Option<&str>) -> Vec<InlineKeyboardButton> {
    single(t_lang("button-home", language_code), Command::Menu)
}

fn grid(buttons: Vec<InlineKeyboardButton>) -> Vec<Vec<InlineKeyboardButton>> {
    buttons
        .chunks(GRID_WIDTH)
        .map(|chunk| chunk.to_vec())
        .collect()
}

fn entry_rows(
    entries: &[Entry],
    command: impl Fn(&str) -> Command,
    language_code: Option<&str>,
) -> Vec<Vec<InlineKeyboardButton>> {
    entries
        .iter()
        .map(|entry| {
            single(
                catalog::entry_label(entry, language_code),
                command(entry.id),
            )
        })
        .collect()
}

fn main_menu_rows(language_code: Option<&str>) -> Vec<Vec<InlineKeyboardButton>> {
    vec![
        single(t_lang("menu-order", language_code), Command::Order),
        single(t_lang("menu-info", language_code), Command::Info),
        single(t_lang("menu-specialist", language_code), Command::Specialist),
        single(t_lang("menu-manager", language_code), Command::Manager),
        single(t_lang("menu-decline", language_code), Command::Decline),
    ]
}

/// Order shortcut shown after informational answers and the discount offer
fn order_shortcut_rows(order_label_key: &str, language_code: Option<&str>) -> Vec<Vec<InlineKeyboardButton>> {
    vec![
        single(t_lang(order_label_key, language_code), Command::Order),
        home_row(language_code),
    ]
}

fn info_topic_rows(language_code: Option<&str>) -> Vec<Vec<InlineKeyboardButton>> {
    let mut rows = entry_rows(
        catalog::INFO_TOPICS,
        |id| Command::Topic(id.to_string()),
        language_code,
    );
    rows.push(single(t_lang("button-back", language_code), Command::Menu));
    rows
}

/// Greeting sent in answer to /start
pub fn greeting(language_code: Option<&str>) -> Screen {
    Screen::new(t_lang("greeting", language_code), main_menu_rows(language_code))
}

pub fn main_menu(language_code: Option<&str>) -> Screen {
    Screen::new(t_lang("menu-prompt", language_code), main_menu_rows(language_code))
}

/// A closing message followed by the main menu
pub fn closing_with_menu(text_key: &str, language_code: Option<&str>) -> Screen {
    Screen::new(t_lang(text_key, language_code), main_menu_rows(language_code))
}

pub fn style_picker(language_code: Option<&str>) -> Screen {
    let buttons = catalog::STYLE_IDS
        .iter()
        .map(|id| {
            button(
                catalog::style_label(id, language_code),
                Command::Style(id.to_string()),
            )
        })
        .collect();

    let mut rows = grid(buttons);
    rows.push(specialist_row(language_code));
    rows.push(home_row(language_code));

    Screen::new(t_lang("style-prompt", language_code), rows)
}

pub fn material_picker(language_code: Option<&str>) -> Screen {
    let mut rows: Vec<_> = catalog::MATERIALS
        .iter()
        .map(|material| {
            single(
                catalog::material_label(material, language_code),
                Command::Material(material.id.to_string()),
            )
        })
        .collect();
    rows.push(specialist_row(language_code));
    rows.push(back_row(BackTarget::Style, language_code));
    rows.push(home_row(language_code));

    Screen::new(t_lang("material-prompt", language_code), rows)
}

/// Color grid for one material; an unknown material yields no color buttons
pub fn color_picker(material_id: &str, language_code: Option<&str>) -> Screen {
    let colors = catalog::material(material_id)
        .map(|material| material.colors)
        .unwrap_or_default();
    let buttons = colors
        .iter()
        .map(|color| {
            button(
                catalog::color_label(color, language_code),
                Command::Color {
                    material: material_id.to_string(),
                    color: color.to_string(),
                },
            )
        })
        .collect();

    let mut rows = grid(buttons);
    rows.push(specialist_row(language_code));
    rows.push(back_row(BackTarget::Material, language_code));
    rows.push(home_row(language_code));

    Screen::new(t_lang("color-prompt", language_code), rows)
}

pub fn insert_picker(language_code: Option<&str>) -> Screen {
    let mut rows = entry_rows(
        catalog::INSERT_TYPES,
        |id| Command::Insert(id.to_string()),
        language_code,
    );
    rows.push(specialist_row(language_code));
    rows.push(back_row(BackTarget::Color, language_code));
    rows.push(home_row(language_code));

    Screen::new(t_lang("insert-prompt", language_code), rows)
}

/// Multi-select option list; selected options carry a check mark
pub fn options_picker(draft: &OrderDraft, language_code: Option<&str>) -> Screen {
    let mut rows: Vec<_> = catalog::OPTION_IDS
        .iter()
        .map(|id| {
            let mark = if draft.options.contains(*id) { "✅" } else { "☑️" };
            single(
                format!("{} {}", mark, catalog::option_label(id, language_code)),
                Command::ToggleOption(id.to_string()),
            )
        })
        .collect();
    rows.push(single(t_lang("options-none", language_code), Command::ClearOptions));
    rows.push(specialist_row(language_code));
    rows.push(single(t_lang("options-done", language_code), Command::OptionsDone));
    rows.push(back_row(BackTarget::Insert, language_code));
    rows.push(home_row(language_code));

    Screen::new(t_lang("options-prompt", language_code), rows)
}

pub fn payment_picker(language_code: Option<&str>) -> Screen {
    let mut rows = entry_rows(
        catalog::PAYMENTS,
        |id| Command::Payment(id.to_string()),
        language_code,
    );
    rows.push(specialist_row(language_code));
    rows.push(back_row(BackTarget::Options, language_code));
    rows.push(home_row(language_code));

    Screen::new(t_lang("payment-prompt", language_code), rows)
}

/// Format the order draft for the confirmation screen
///
/// Every value goes through the catalogs; anything unset or unknown is shown
/// as the placeholder.
pub fn format_order_summary(draft: &OrderDraft, language_code: Option<&str>) -> String {
    let placeholder = t_lang("placeholder", language_code);
    let or_placeholder = |value: Option<String>| value.unwrap_or_else(|| placeholder.clone());

    let style = draft
        .style
        .as_deref()
        .filter(|id| catalog::is_style(id))
        .map(|id| catalog::style_label(id, language_code));

    let material = draft
        .material
        .as_deref()
        .and_then(catalog::material)
        .map(|material| catalog::material_label(material, language_code));

    let color = match (draft.material.as_deref(), draft.color.as_deref()) {
        (Some(material), Some(color)) if catalog::is_color_of(material, color) => {
            Some(catalog::color_label(color, language_code))
        }
        _ => None,
    };

    let insert = draft
        .insert
        .as_deref()
        .and_then(catalog::insert_type)
        .map(|entry| catalog::entry_label(entry, language_code));

    let option_labels: Vec<String> = catalog::OPTION_IDS
        .iter()
        .filter(|id| draft.options.contains(**id))
        .map(|id| catalog::option_label(id, language_code))
        .collect();
    let options = (!option_labels.is_empty()).then(|| option_labels.join(", "));

    let payment = draft
        .payment
        .as_deref()
        .and_then(catalog::payment)
        .map(|entry| catalog::entry_label(entry, language_code));

    let lines = [
        t_args_lang("summary-style", &[("value", or_placeholder(style).as_str())], language_code),
        t_args_lang("summary-material", &[("value", or_placeholder(material).as_str())], language_code),
        t_args_lang("summary-color", &[("value", or_placeholder(color).as_str())], language_code),
        t_args_lang("summary-insert", &[("value", or_placeholder(insert).as_str())], language_code),
        t_args_lang("summary-options", &[("value", or_placeholder(options).as_str())], language_code),
        t_args_lang("summary-payment", &[("value", or_placeholder(payment).as_str())], language_code),
    ];

    format!(
        "{}\n\n{}\n\n{}",
        t_lang("summary-title", language_code),
        lines.join("\n"),
        t_lang("summary-hint", language_code)
    )
}

pub fn order_summary(draft: &OrderDraft, language_code: Option<&str>) -> Screen {
    let rows = vec![
        single(t_lang("confirm-button", language_code), Command::Confirm),
        back_row(BackTarget::Payment, language_code),
        home_row(language_code),
    ];
    Screen::new(format_order_summary(draft, language_code), rows)
}

pub fn info_intro(language_code: Option<&str>) -> Screen {
    let text = format!(
        "{}\n\n{}",
        t_lang("info-intro", language_code),
        t_lang("info-choose", language_code)
    );
    Screen::new(text, info_topic_rows(language_code))
}

pub fn info_topic(topic: &Entry, language_code: Option<&str>) -> Screen {
    let title = catalog::entry_label(topic, language_code);
    let text = format!(
        "{}\n\n{}",
        t_args_lang("info-topic-detail", &[("topic", title.as_str())], language_code),
        t_lang("info-order-offer", language_code)
    );
    Screen::new(text, order_shortcut_rows("menu-order", language_code))
}

pub fn decline_reasons(language_code: Option<&str>) -> Screen {
    let mut rows: Vec<_> = DeclineReason::ALL
        .iter()
        .map(|reason| {
            single(
                t_lang(reason.label_key(), language_code),
                Command::Reason(*reason),
            )
        })
        .collect();
    rows.push(specialist_row(language_code));
    rows.push(home_row(language_code));

    Screen::new(t_lang("decline-prompt", language_code), rows)
}

pub fn discount_offer(language_code: Option<&str>) -> Screen {
    Screen::new(
        t_lang("decline-discount", language_code),
        order_shortcut_rows("decline-discount-accept", language_code),
    )
}

pub fn browsing_topics(language_code: Option<&str>) -> Screen {
    Screen::new(
        t_lang("decline-browsing-prompt", language_code),
        info_topic_rows(language_code),
    )
}

/// Plain prompt asking for free text; removes any keyboard when edited in
pub fn prompt(text_key: &str, language_code: Option<&str>) -> Screen {
    Screen::text_only(t_lang(text_key, language_code))
}
