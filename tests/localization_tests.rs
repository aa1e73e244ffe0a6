//! # Localization Tests
//!
//! Message lookup, language fallback and argument formatting for the bundled
//! Russian and English resources.

use autochehol::localization::LocalizationManager;
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("greeting", "ru", None);
        assert_eq!(message, "Здравствуйте! Чем могу помочь?");

        let message = manager.get_message_in_language("greeting", "en", None);
        assert!(message.starts_with("Hello"));
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "ru", None);
        assert_eq!(message, "Missing translation: nonexistent-key");
    }

    #[test]
    fn test_unsupported_language_falls_back_to_russian() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("payment-4", "de", None);
        assert_eq!(message, "Рассрочка");
        assert!(!manager.is_supported("de"));
    }

    #[test]
    fn test_regional_language_codes() {
        let manager = setup_localization();

        assert!(manager.is_supported("en-GB"));
        let message = manager.get_message_in_language("payment-2", "en-GB", None);
        assert_eq!(message, "Card online");
    }

    #[test]
    fn test_configured_default_language() {
        let manager =
            LocalizationManager::with_default_language("en").expect("Failed to create manager");
        assert_eq!(manager.get_message("payment-4", None), "Installments");

        // Unknown defaults fall back to Russian
        let manager =
            LocalizationManager::with_default_language("xx").expect("Failed to create manager");
        assert_eq!(manager.get_message("payment-4", None), "Рассрочка");
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("value", "Каньон");

        let message = manager.get_message_in_language("summary-material", "ru", Some(&args));
        assert_eq!(message, "• Материал: Каньон");
    }

    #[test]
    fn test_get_message_missing_args() {
        let manager = setup_localization();

        // Formatting errors are swallowed, the rest of the pattern survives
        let message = manager.get_message_in_language("style-label", "ru", None);
        assert!(message.starts_with("Стиль"));
    }

    #[test]
    fn test_every_key_is_translated_in_both_languages() {
        let manager = setup_localization();
        let keys = [
            "greeting",
            "menu-prompt",
            "fallback",
            "button-specialist-help",
            "button-back",
            "button-home",
            "material-oregon",
            "insert-perf",
            "options-done",
            "summary-title",
            "confirm-button",
            "order-thanks",
            "info-install",
            "phone-prompt",
            "decline-discount",
            "decline-other-thanks",
        ];

        for key in keys {
            for language in ["ru", "en"] {
                let message = manager.get_message_in_language(key, language, None);
                assert!(
                    !message.starts_with("Missing"),
                    "{key} missing in {language}"
                );
            }
        }
    }

    #[test]
    fn test_convenience_functions() {
        autochehol::localization::init_localization("ru")
            .expect("Failed to initialize localization");

        let message = autochehol::localization::t_lang("menu-decline", Some("en"));
        assert!(!message.is_empty());
        assert!(!message.starts_with("Missing"));

        let args = vec![("id", "3")];
        let label = autochehol::localization::t_args_lang("option-label", &args, Some("ru"));
        assert_eq!(label, "Опция 3");
    }
}
