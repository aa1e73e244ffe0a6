//! # Command Module
//!
//! Parses callback tokens of the form `AUTO:<VERB>[:<ARG>[:<ARG>]]` into
//! [`Command`] values and classifies incoming text messages.

use std::str::FromStr;

use crate::catalog::DeclineReason;

/// Namespace prefix carried by every callback token this bot emits
pub const NAMESPACE: &str = "AUTO";

/// Step of the order wizard a back button returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackTarget {
    Style,
    Material,
    Color,
    Insert,
    Options,
    Payment,
}

impl BackTarget {
    fn token(self) -> &'static str {
        match self {
            BackTarget::Style => "STYLE",
            BackTarget::Material => "MATERIAL",
            BackTarget::Color => "COLOR",
            BackTarget::Insert => "INSERT",
            BackTarget::Options => "OPTIONS",
            BackTarget::Payment => "PAY",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "STYLE" => Some(BackTarget::Style),
            "MATERIAL" => Some(BackTarget::Material),
            "COLOR" => Some(BackTarget::Color),
            "INSERT" => Some(BackTarget::Insert),
            "OPTIONS" => Some(BackTarget::Options),
            "PAY" => Some(BackTarget::Payment),
            _ => None,
        }
    }
}

/// A button press decoded from its callback token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Menu,
    Order,
    Style(String),
    Material(String),
    Color { material: String, color: String },
    Insert(String),
    ToggleOption(String),
    ClearOptions,
    OptionsDone,
    Payment(String),
    Confirm,
    Info,
    Topic(String),
    Specialist,
    Manager,
    Decline,
    Reason(DeclineReason),
    Back(BackTarget),
}

/// Reasons a callback token is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Token does not start with the `AUTO` namespace
    ForeignNamespace(String),
    /// Token contains an empty or non-ASCII segment
    Malformed(String),
    /// Verb or argument count is not recognized
    Unknown(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::ForeignNamespace(token) => write!(f, "Foreign callback token: {token}"),
            CommandError::Malformed(token) => write!(f, "Malformed callback token: {token}"),
            CommandError::Unknown(token) => write!(f, "Unknown callback command: {token}"),
        }
    }
}

impl std::error::Error for CommandError {}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let mut segments = token.split(':');

        if segments.next() != Some(NAMESPACE) {
            return Err(CommandError::ForeignNamespace(token.to_string()));
        }

        let args: Vec<&str> = segments.collect();
        if args.is_empty() || args.len() > 3 || !args.iter().all(|s| is_identifier(s)) {
            return Err(CommandError::Malformed(token.to_string()));
        }

        let command = match args.as_slice() {
            ["MENU"] => Command::Menu,
            ["ORDER"] => Command::Order,
            ["STYLE", id] => Command::Style(id.to_string()),
            ["MATERIAL", id] => Command::Material(id.to_string()),
            ["COLOR", material, color] => Command::Color {
                material: material.to_string(),
                color: color.to_string(),
            },
            ["INSERT", id] => Command::Insert(id.to_string()),
            ["OPT", "ZERO"] => Command::ClearOptions,
            ["OPT", "DONE"] => Command::OptionsDone,
            ["OPT", id] => Command::ToggleOption(id.to_string()),
            ["PAY", id] => Command::Payment(id.to_string()),
            ["CONFIRM"] => Command::Confirm,
            ["INFO"] => Command::Info,
            ["INFO", topic] => Command::Topic(topic.to_string()),
            ["SPECIALIST"] => Command::Specialist,
            ["MANAGER"] => Command::Manager,
            ["DECLINE"] => Command::Decline,
            ["DECLINE", reason] => match DeclineReason::from_id(reason) {
                Some(reason) => Command::Reason(reason),
                None => return Err(CommandError::Unknown(token.to_string())),
            },
            ["BACK", target] => match BackTarget::from_token(target) {
                Some(target) => Command::Back(target),
                None => return Err(CommandError::Unknown(token.to_string())),
            },
            _ => return Err(CommandError::Unknown(token.to_string())),
        };

        Ok(command)
    }
}

impl Command {
    /// Encode the command back into the callback token carried by a button
    pub fn token(&self) -> String {
        match self {
            Command::Menu => format!("{NAMESPACE}:MENU"),
            Command::Order => format!("{NAMESPACE}:ORDER"),
            Command::Style(id) => format!("{NAMESPACE}:STYLE:{id}"),
            Command::Material(id) => format!("{NAMESPACE}:MATERIAL:{id}"),
            Command::Color { material, color } => format!("{NAMESPACE}:COLOR:{material}:{color}"),
            Command::Insert(id) => format!("{NAMESPACE}:INSERT:{id}"),
            Command::ToggleOption(id) => format!("{NAMESPACE}:OPT:{id}"),
            Command::ClearOptions => format!("{NAMESPACE}:OPT:ZERO"),
            Command::OptionsDone => format!("{NAMESPACE}:OPT:DONE"),
            Command::Payment(id) => format!("{NAMESPACE}:PAY:{id}"),
            Command::Confirm => format!("{NAMESPACE}:CONFIRM"),
            Command::Info => format!("{NAMESPACE}:INFO"),
            Command::Topic(topic) => format!("{NAMESPACE}:INFO:{topic}"),
            Command::Specialist => format!("{NAMESPACE}:SPECIALIST"),
            Command::Manager => format!("{NAMESPACE}:MANAGER"),
            Command::Decline => format!("{NAMESPACE}:DECLINE"),
            Command::Reason(reason) => format!("{NAMESPACE}:DECLINE:{}", reason.id()),
            Command::Back(target) => format!("{NAMESPACE}:BACK:{}", target.token()),
        }
    }
}

/// An event the conversation router reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `/start` or `/autochehol`
    Start,
    /// Inline keyboard button press
    Button(Command),
    /// Free text typed by the user
    Text(String),
}

/// Classification of a text message before routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    Event(Inbound),
    /// Slash command the bot does not serve
    UnknownCommand(String),
}

/// Classify a text message as a bot command or free text
pub fn classify_text(text: &str) -> TextInput {
    let trimmed = text.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return TextInput::Event(Inbound::Text(trimmed.to_string()));
    };

    // "/start@my_bot payload" addresses the bot explicitly in group chats
    let name = command
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .split('@')
        .next()
        .unwrap_or_default();

    match name {
        "start" | "autochehol" => TextInput::Event(Inbound::Start),
        _ => TextInput::UnknownCommand(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_verbs() {
        assert_eq!("AUTO:MENU".parse::<Command>(), Ok(Command::Menu));
        assert_eq!("AUTO:ORDER".parse::<Command>(), Ok(Command::Order));
        assert_eq!("AUTO:CONFIRM".parse::<Command>(), Ok(Command::Confirm));
        assert_eq!("AUTO:INFO".parse::<Command>(), Ok(Command::Info));
        assert_eq!("AUTO:DECLINE".parse::<Command>(), Ok(Command::Decline));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!("AUTO:STYLE:5".parse::<Command>(), Ok(Command::Style("5".to_string())));
        assert_eq!(
            "AUTO:COLOR:oregon:7".parse::<Command>(),
            Ok(Command::Color {
                material: "oregon".to_string(),
                color: "7".to_string()
            })
        );
        assert_eq!("AUTO:OPT:ZERO".parse::<Command>(), Ok(Command::ClearOptions));
        assert_eq!("AUTO:OPT:DONE".parse::<Command>(), Ok(Command::OptionsDone));
        assert_eq!("AUTO:OPT:3".parse::<Command>(), Ok(Command::ToggleOption("3".to_string())));
        assert_eq!("AUTO:INFO:warranty".parse::<Command>(), Ok(Command::Topic("warranty".to_string())));
        assert_eq!(
            "AUTO:DECLINE:expensive".parse::<Command>(),
            Ok(Command::Reason(DeclineReason::Expensive))
        );
        assert_eq!("AUTO:BACK:PAY".parse::<Command>(), Ok(Command::Back(BackTarget::Payment)));
    }

    #[test]
    fn test_reject_foreign_and_malformed_tokens() {
        assert!(matches!(
            "edit_0".parse::<Command>(),
            Err(CommandError::ForeignNamespace(_))
        ));
        assert!(matches!(
            "AUTOX:MENU".parse::<Command>(),
            Err(CommandError::ForeignNamespace(_))
        ));
        assert!(matches!("AUTO".parse::<Command>(), Err(CommandError::Malformed(_))));
        assert!(matches!("AUTO::".parse::<Command>(), Err(CommandError::Malformed(_))));
        assert!(matches!(
            "AUTO:STYLE:пять".parse::<Command>(),
            Err(CommandError::Malformed(_))
        ));
        assert!(matches!(
            "AUTO:A:B:C:D".parse::<Command>(),
            Err(CommandError::Malformed(_))
        ));
        assert!(matches!("AUTO:FLY".parse::<Command>(), Err(CommandError::Unknown(_))));
        assert!(matches!(
            "AUTO:BACK:HOME".parse::<Command>(),
            Err(CommandError::Unknown(_))
        ));
        assert!(matches!(
            "AUTO:DECLINE:bored".parse::<Command>(),
            Err(CommandError::Unknown(_))
        ));
    }

    #[test]
    fn test_tokens_parse_back_to_the_same_command() {
        let commands = [
            Command::Color {
                material: "dakota".to_string(),
                color: "2".to_string(),
            },
            Command::ClearOptions,
            Command::Reason(DeclineReason::Other),
            Command::Back(BackTarget::Options),
        ];
        for command in commands {
            assert_eq!(command.token().parse::<Command>(), Ok(command.clone()));
        }
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify_text("/start"), TextInput::Event(Inbound::Start));
        assert_eq!(classify_text("/start@autochehol_bot"), TextInput::Event(Inbound::Start));
        assert_eq!(classify_text("/autochehol"), TextInput::Event(Inbound::Start));
        assert_eq!(
            classify_text("/help"),
            TextInput::UnknownCommand("help".to_string())
        );
        assert_eq!(
            classify_text("  need red  "),
            TextInput::Event(Inbound::Text("need red".to_string()))
        );
    }
}
