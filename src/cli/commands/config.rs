use anyhow::Result;
use std::path::PathBuf;

use crate::cli::commands::Command;
use crate::config::{config, WcAdminConfig};

pub struct ConfigCommand {
    pub output: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }
}

/// Copy of the configuration safe to print
pub fn redacted(settings: &WcAdminConfig) -> WcAdminConfig {
    let mut copy = settings.clone();
    if copy.site.application_password.is_some() {
        copy.site.application_password = Some("********".to_string());
    }
    copy
}

impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        let settings = config()?;

        match &self.output {
            Some(path) => {
                settings.save_to_file(path)?;
                println!("✅ Configuration written to {}", path.display());
            }
            None => {
                println!("⚙️  Effective configuration:");
                println!();
                print!("{}", toml::to_string_pretty(&redacted(settings))?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_redacted() {
        let mut settings = WcAdminConfig::default();
        settings.site.application_password = Some("secret".to_string());
        let shown = toml::to_string_pretty(&redacted(&settings)).unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains("********"));
    }
}
