//! # Catalog Module
//!
//! Static menu tables for the order wizard and the side branches. Every entry
//! pairs a short identifier, used inside callback tokens, with the
//! localization key of its display label.

use crate::localization::{t_args_lang, t_lang};

/// A selectable catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub id: &'static str,
    pub label_key: &'static str,
}

const fn entry(id: &'static str, label_key: &'static str) -> Entry {
    Entry { id, label_key }
}

/// A material together with the colors it is produced in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    pub id: &'static str,
    pub label_key: &'static str,
    pub colors: &'static [&'static str],
}

pub const STYLE_IDS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22",
];

pub const MATERIALS: &[Material] = &[
    Material {
        id: "oregon",
        label_key: "material-oregon",
        colors: &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"],
    },
    Material {
        id: "canyon",
        label_key: "material-canyon",
        colors: &["1", "2", "3", "4"],
    },
    Material {
        id: "dakota",
        label_key: "material-dakota",
        colors: &["1", "2", "3", "4"],
    },
];

pub const INSERT_TYPES: &[Entry] = &[entry("perf", "insert-perf"), entry("smooth", "insert-smooth")];

pub const OPTION_IDS: &[&str] = &["1", "2", "3", "4", "5", "6"];

pub const PAYMENTS: &[Entry] = &[
    entry("1", "payment-1"),
    entry("2", "payment-2"),
    entry("3", "payment-3"),
    entry("4", "payment-4"),
];

pub const INFO_TOPICS: &[Entry] = &[
    entry("materials", "info-materials"),
    entry("delivery", "info-delivery"),
    entry("warranty", "info-warranty"),
    entry("pricing", "info-pricing"),
    entry("install", "info-install"),
];

/// Reasons offered when the user is not interested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclineReason {
    Expensive,
    Missing,
    Browsing,
    Other,
}

impl DeclineReason {
    pub const ALL: [DeclineReason; 4] = [
        DeclineReason::Expensive,
        DeclineReason::Missing,
        DeclineReason::Browsing,
        DeclineReason::Other,
    ];

    pub fn id(self) -> &'static str {
        match self {
            DeclineReason::Expensive => "expensive",
            DeclineReason::Missing => "missing",
            DeclineReason::Browsing => "browsing",
            DeclineReason::Other => "other",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.id() == id)
    }

    pub fn label_key(self) -> &'static str {
        match self {
            DeclineReason::Expensive => "decline-expensive",
            DeclineReason::Missing => "decline-missing",
            DeclineReason::Browsing => "decline-browsing",
            DeclineReason::Other => "decline-other",
        }
    }
}

fn find_entry(entries: &'static [Entry], id: &str) -> Option<&'static Entry> {
    entries.iter().find(|entry| entry.id == id)
}

pub fn is_style(id: &str) -> bool {
    STYLE_IDS.contains(&id)
}

pub fn material(id: &str) -> Option<&'static Material> {
    MATERIALS.iter().find(|material| material.id == id)
}

/// Whether `color` exists for the given material
pub fn is_color_of(material_id: &str, color: &str) -> bool {
    material(material_id).is_some_and(|material| material.colors.contains(&color))
}

pub fn insert_type(id: &str) -> Option<&'static Entry> {
    find_entry(INSERT_TYPES, id)
}

pub fn is_option(id: &str) -> bool {
    OPTION_IDS.contains(&id)
}

pub fn payment(id: &str) -> Option<&'static Entry> {
    find_entry(PAYMENTS, id)
}

pub fn info_topic(id: &str) -> Option<&'static Entry> {
    find_entry(INFO_TOPICS, id)
}

pub fn style_label(id: &str, language_code: Option<&str>) -> String {
    t_args_lang("style-label", &[("id", id)], language_code)
}

pub fn color_label(id: &str, language_code: Option<&str>) -> String {
    t_args_lang("color-label", &[("id", id)], language_code)
}

pub fn option_label(id: &str, language_code: Option<&str>) -> String {
    t_args_lang("option-label", &[("id", id)], language_code)
}

pub fn material_label(material: &Material, language_code: Option<&str>) -> String {
    t_lang(material.label_key, language_code)
}

pub fn entry_label(entry: &Entry, language_code: Option<&str>) -> String {
    t_lang(entry.label_key, language_code)
}
