use {
    anyhow::{Context, Result},
    milestones::PolicyConfig,
    serde::{Deserialize, Serialize},
    std::path::{Path, PathBuf},
};

/// File based configuration of the command.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    #[serde(default)]
    pub policy: PolicyConfig,

    /// JSON exception code catalog. Relative paths are resolved against the
    /// directory of the configuration file.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

impl Configuration {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse configuration {}", path.display()))?;

        let dir = path.parent().unwrap_or(Path::new(""));
        if let Some(catalog) = config.catalog.as_mut().filter(|catalog| catalog.is_relative()) {
            *catalog = dir.join(&*catalog);
        }

        tracing::info!(
            path = %path.display(),
            exception_threshold = config.policy.exception_threshold,
            max_date_age_days = config.policy.max_date_age_days(),
            "loaded configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn deserialize_defaults() {
        let config: Configuration = toml::from_str("").unwrap();
        assert_eq!(config.policy.exception_threshold, 7);
        assert_eq!(config.policy.max_date_age_days(), 365);
        assert_eq!(config.catalog, None);
    }

    #[test]
    fn deserialize_full() {
        let toml = r#"
        catalog = "/etc/milestones/exception-codes.json"

        [policy]
        exception-threshold = 11
        max-date-age = "180days"
        "#;
        let config: Configuration = toml::from_str(toml).unwrap();
        assert_eq!(config.policy.exception_threshold, 11);
        assert_eq!(config.policy.max_date_age_days(), 180);
        assert_eq!(
            config.catalog,
            Some(PathBuf::from("/etc/milestones/exception-codes.json"))
        );
    }

    #[test]
    fn rejects_unknown_sections() {
        assert!(toml::from_str::<Configuration>("[server]\nport = 8080").is_err());
    }

    #[test]
    fn resolves_catalog_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("milestones.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "catalog = \"codes.json\"").unwrap();

        let config = Configuration::from_path(&path).unwrap();
        assert_eq!(config.catalog, Some(dir.path().join("codes.json")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Configuration::from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read configuration"));
    }
}
