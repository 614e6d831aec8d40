//! Configuration resolution for imdb-etl
//!
//! Turns the shared TOML config into validated session settings. Ranking
//! policy names are checked here so a typo fails at startup, not mid-session.

use std::path::PathBuf;

use imdb_common::config::{
    LoggingConfig, RankingConfig, RootFolderInitializer, RootFolderResolver, SourcesConfig,
    TomlConfig,
};
use tracing::info;

use crate::error::EtlResult;
use crate::services::{RankingOptions, SourceFiles, Workspace};
use crate::session::SessionSettings;

/// Module name used for the config file (`<config dir>/imdb-etl/etl.toml`)
pub const MODULE_NAME: &str = "etl";

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub root_folder: PathBuf,
    pub logging: LoggingConfig,
    pub sources: SourcesConfig,
    pub ranking: RankingOptions,
}

impl EtlConfig {
    /// Load the config file and resolve the root folder
    pub fn resolve(resolver: &RootFolderResolver) -> EtlResult<Self> {
        let toml_config = resolver.load_config();
        let root_folder = resolver.resolve_with_config(&toml_config);
        Self::from_toml(&toml_config, root_folder)
    }

    pub fn from_toml(config: &TomlConfig, root_folder: PathBuf) -> EtlResult<Self> {
        Ok(Self {
            root_folder,
            logging: config.logging.clone(),
            sources: config.sources.clone(),
            ranking: ranking_options(&config.ranking)?,
        })
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::from_initializer(&RootFolderInitializer::new(self.root_folder.clone()))
    }

    pub fn session_settings(&self) -> SessionSettings {
        let workspace = self.workspace();
        let sources = SourceFiles::in_folder(workspace.raw_folder());
        info!(
            root = %self.root_folder.display(),
            sort_key = %self.ranking.sort_key,
            tie_break = %self.ranking.tie_break,
            "Session settings"
        );

        SessionSettings {
            workspace,
            sources,
            ranking: self.ranking,
        }
    }
}

/// Parse the ranking policy names
pub fn ranking_options(config: &RankingConfig) -> EtlResult<RankingOptions> {
    Ok(RankingOptions {
        sort_key: config.sort_key.parse()?,
        tie_break: config.tie_break.parse()?,
    })
}
