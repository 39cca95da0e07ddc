use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::Path;

use octo_core::{ApiHost, GitHubProvider, ProviderError, SharedProvider, TranslationError, Translator};
use octo_mcp::{
    ServerSettings,
    ToolsetSelection,
    build_toolset_group,
    dynamic_toolset,
    platform_toolsets,
};
use octo_toolsets::{ToolsetError, ToolsetGroup};

use crate::config::OctoConfig;

#[derive(Debug)]
pub enum StartupError {
    Provider(ProviderError),
    Translations(TranslationError),
    UnknownToolset { name: String, known: Vec<String> },
    Toolsets(ToolsetError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(err) => write!(f, "failed to build GitHub provider: {err}"),
            Self::Translations(err) => write!(f, "failed to load translations: {err}"),
            Self::UnknownToolset { name, known } => write!(
                f,
                "unknown toolset {name}; available toolsets: {}",
                known.join(", ")
            ),
            Self::Toolsets(err) => write!(f, "failed to assemble toolsets: {err}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Translations(err) => Some(err),
            Self::Toolsets(err) => Some(err),
            Self::UnknownToolset { .. } => None,
        }
    }
}

impl From<ProviderError> for StartupError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<TranslationError> for StartupError {
    fn from(err: TranslationError) -> Self {
        Self::Translations(err)
    }
}

pub fn build_provider(config: &OctoConfig) -> Result<SharedProvider, StartupError> {
    let host = ApiHost::parse(config.host.as_deref()).map_err(ProviderError::from)?;
    let provider = GitHubProvider::new(host, Some(config.token.clone()))?;
    Ok(provider.into_shared())
}

pub fn load_translator(config: &OctoConfig) -> Result<Translator, StartupError> {
    let translator = match config.translations_file.as_deref() {
        Some(path) => Translator::from_file(path)?,
        None => Translator::new(BTreeMap::new()),
    };
    Ok(translator)
}

pub fn build_settings(config: &OctoConfig) -> Result<ServerSettings, StartupError> {
    let selection = ToolsetSelection {
        enabled: config.toolsets.clone(),
        dynamic: config.dynamic_toolsets,
        read_only: config.read_only,
    };
    Ok(
        ServerSettings::new(selection, build_provider(config)?, load_translator(config)?)
            .with_request_timeout(config.request_timeout),
    )
}

/// Assembles the first group, rejecting unknown toolset names with the list of
/// valid ones.
pub async fn initial_group(settings: &ServerSettings) -> Result<ToolsetGroup, StartupError> {
    build_toolset_group(&settings.selection, &settings.provider, &settings.translator)
        .await
        .map_err(|err| match err {
            ToolsetError::UnknownToolset(name) => StartupError::UnknownToolset {
                name,
                known: platform_toolsets(&settings.provider, &Translator::null())
                    .iter()
                    .map(|toolset| toolset.name().to_string())
                    .collect(),
            },
            other => StartupError::Toolsets(other),
        })
}

/// Resolves every translation key, dynamic tools included, and writes them to `path`.
pub fn export_translations(settings: &ServerSettings, path: &Path) -> Result<(), StartupError> {
    let translator = &settings.translator;
    let _ = platform_toolsets(&settings.provider, translator);
    let _ = dynamic_toolset(&ToolsetGroup::new(false), translator);
    translator.export(path)?;
    Ok(())
}
