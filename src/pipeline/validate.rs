// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;
use crate::utils;

/// Load the configuration at `path` and check it.
///
/// Unlike the crawl commands, a missing or unreadable file is an error here.
pub fn run_validate(path: &Path) -> Result<Config> {
    utils::log::header("Validating configuration");

    let config = Config::load(path).and_then(|config| {
        config.validate()?;
        Ok(config)
    });
    match config {
        Ok(config) => {
            log::info!("Configuration OK: {}", path.display());
            utils::log::sub_item(&format!("User agent: {}", config.crawler.user_agent));
            utils::log::sub_item(&format!("Timeout: {}s", config.crawler.timeout_secs));
            utils::log::sub_item(&format!(
                "Wait timeout: {}s",
                config.crawler.wait_timeout_secs
            ));
            utils::log::sub_item(&format!(
                "Reference types: {}",
                config.catalog.ref_types.join(", ")
            ));
            utils::log::sub_item(&format!(
                "Sections: {}",
                config
                    .sections
                    .sections
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
            Ok(config)
        }
        Err(e) => {
            log::error!("Configuration invalid ({}): {e}", path.display());
            Err(e)
        }
    }
}
