use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use unic_langid::LanguageIdentifier;

/// Language used when the user's language is unknown or unsupported
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Languages with a bundled resource file
const LOCALES: &[(&str, &str)] = &[
    ("ru", include_str!("../locales/ru/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager for the bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    default_language: String,
}

impl LocalizationManager {
    /// Create a new localization manager with every bundled language loaded
    pub fn new() -> Result<Self> {
        Self::with_default_language(DEFAULT_LANGUAGE)
    }

    /// Create a manager that falls back to `default_language` instead of Russian
    pub fn with_default_language(default_language: &str) -> Result<Self> {
        let mut bundles = HashMap::new();

        for (code, source) in LOCALES {
            let locale: LanguageIdentifier = code.parse()?;
            let bundle = Self::create_bundle(locale, source)?;
            bundles.insert(code.to_string(), bundle);
        }

        let default_language = if bundles.contains_key(default_language) {
            default_language.to_string()
        } else {
            DEFAULT_LANGUAGE.to_string()
        };

        Ok(Self {
            bundles,
            default_language,
        })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Labels end up inside Telegram buttons, where bidi isolation marks show as garbage
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid resource for {locale}: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate messages for {locale}: {errors:?}"))?;

        Ok(bundle)
    }

    /// Whether a bundle exists for the given language code
    pub fn is_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(normalize_language(language))
    }

    /// Get a localized message in the requested language
    ///
    /// Unsupported languages fall back to the default language. Unknown keys
    /// produce a `Missing translation: <key>` marker instead of failing.
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self.bundles.get(normalize_language(language)) {
            Some(bundle) => bundle,
            None => match self.bundles.get(&self.default_language) {
                Some(bundle) => bundle,
                None => return format!("Missing translation: {key}"),
            },
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        value.into_owned()
    }

    /// Get a localized message in the default language
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        self.get_message_in_language(key, &self.default_language, args)
    }
}

/// Reduce a Telegram language code such as `en-US` to its primary subtag
fn normalize_language(language: &str) -> &str {
    language.split(['-', '_']).next().unwrap_or(language)
}

static LOCALIZATION_MANAGER: OnceLock<Option<LocalizationManager>> = OnceLock::new();

fn load(default_language: &str) -> Option<LocalizationManager> {
    match LocalizationManager::with_default_language(default_language) {
        Ok(manager) => Some(manager),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load localization resources");
            None
        }
    }
}

fn manager() -> Option<&'static LocalizationManager> {
    LOCALIZATION_MANAGER
        .get_or_init(|| load(DEFAULT_LANGUAGE))
        .as_ref()
}

/// Initialize the global localization manager with the given fallback language
///
/// Only the first initialization takes effect.
pub fn init_localization(default_language: &str) -> Result<()> {
    match LOCALIZATION_MANAGER.get_or_init(|| load(default_language)) {
        Some(_) => Ok(()),
        None => Err(anyhow!("Localization resources failed to load")),
    }
}

/// Get a localized message for an optional user language
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    match manager() {
        Some(manager) => match language_code {
            Some(language) => manager.get_message_in_language(key, language, None),
            None => manager.get_message(key, None),
        },
        None => format!("Missing translation: {key}"),
    }
}

/// Get a localized message with arguments for an optional user language
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    match manager() {
        Some(manager) => {
            let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
            match language_code {
                Some(language) => manager.get_message_in_language(key, language, Some(&args_map)),
                None => manager.get_message(key, Some(&args_map)),
            }
        }
        None => format!("Missing translation: {key}"),
    }
}
