use {
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

const SECONDS_PER_DAY: u64 = 86_400;

const fn default_exception_threshold() -> u32 {
    7
}

const fn default_max_date_age() -> Duration {
    Duration::from_secs(365 * SECONDS_PER_DAY) // 1y
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PolicyConfig {
    /// Business-day gap between two milestones from which on an exception
    /// code has to be supplied.
    #[serde(default = "default_exception_threshold")]
    pub exception_threshold: u32,

    /// How far in the past a proposed milestone date may lie. Only whole days
    /// are taken into account.
    #[serde(with = "humantime_serde", default = "default_max_date_age")]
    pub max_date_age: Duration,
}

impl PolicyConfig {
    pub fn max_date_age_days(&self) -> u64 {
        self.max_date_age.as_secs() / SECONDS_PER_DAY
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            exception_threshold: default_exception_threshold(),
            max_date_age: default_max_date_age(),
        }
    }
}
