use {
    milestones::CalendarDate,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    tracing::level_filters::LevelFilter,
};

#[derive(clap::Parser)]
#[clap(
    name = "milestone-check",
    about = "Validates shipment milestone updates and reports business-day gaps"
)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// Path to a TOML file with the validation policy and the catalog
    /// location. Defaults apply when unset.
    #[clap(long, env = "MILESTONE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to a JSON exception code catalog. Takes precedence over the
    /// catalog from the configuration file. The bundled catalog is used when
    /// neither is set.
    #[clap(long, env = "MILESTONE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Validate as if today were this date instead of the local date.
    #[clap(long, env = "MILESTONE_TODAY")]
    pub today: Option<CalendarDate>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn")]
    pub log_filter: String,

    /// Events at least as severe as this level are written to stderr, the
    /// rest to stdout. Everything goes to stderr by default so that stdout
    /// only carries results.
    #[clap(long, env, default_value = "trace")]
    pub log_stderr_threshold: LevelFilter,

    /// Output log events as JSON.
    #[clap(long, env, action = clap::ArgAction::Set, default_value = "false")]
    pub log_json: bool,
}

impl LoggingArguments {
    pub fn observe_config(&self) -> observe::Config {
        observe::Config::new(
            &self.log_filter,
            self.log_stderr_threshold,
            self.log_json,
        )
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Validates a proposed milestone date against the recorded milestones of
    /// a shipment. Exits with a failure status when the update is rejected.
    Validate {
        /// JSON document with the recorded milestones.
        #[clap(long)]
        milestones: PathBuf,
        /// JSON document with the proposed update.
        #[clap(long)]
        request: PathBuf,
    },
    /// Counts the business days after START up to and including END.
    BusinessDays { start: CalendarDate, end: CalendarDate },
    /// Lists the business-day gaps between the recorded milestones.
    Gaps {
        #[clap(long)]
        milestones: PathBuf,
    },
    /// Prints the exception code catalog in use.
    Catalog,
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            config,
            catalog,
            today,
            command,
        } = self;

        write!(f, "{logging}")?;
        display_option(f, "config", &config.as_ref().map(|path| path.display()))?;
        display_option(f, "catalog", &catalog.as_ref().map(|path| path.display()))?;
        display_option(f, "today", today)?;
        writeln!(f, "command: {command:?}")?;
        Ok(())
    }
}

impl Display for LoggingArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            log_json,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "log_json: {log_json}")?;
        Ok(())
    }
}

pub fn display_option(
    f: &mut Formatter<'_>,
    name: &str,
    option: &Option<impl Display>,
) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, clap::Parser};

    #[test]
    fn parses_validate_command() {
        let args = Arguments::try_parse_from([
            "milestone-check",
            "--today",
            "2024-06-03",
            "validate",
            "--milestones",
            "milestones.json",
            "--request",
            "request.json",
        ])
        .unwrap();

        assert_eq!(args.today, CalendarDate::from_ymd(2024, 6, 3));
        assert!(matches!(
            args.command,
            Command::Validate { ref milestones, ref request }
                if milestones == &PathBuf::from("milestones.json")
                    && request == &PathBuf::from("request.json")
        ));
    }

    #[test]
    fn parses_business_days_with_timestamps() {
        let args = Arguments::try_parse_from([
            "milestone-check",
            "business-days",
            "2024-05-01 08:00:00",
            "2024-05-10",
        ])
        .unwrap();

        let Command::BusinessDays { start, end } = args.command else {
            panic!("unexpected command {:?}", args.command);
        };
        assert_eq!(start, CalendarDate::from_ymd(2024, 5, 1).unwrap());
        assert_eq!(end, CalendarDate::from_ymd(2024, 5, 10).unwrap());
    }

    #[test]
    fn rejects_invalid_dates() {
        assert!(
            Arguments::try_parse_from([
                "milestone-check",
                "business-days",
                "tomorrow",
                "2024-05-10",
            ])
            .is_err()
        );
    }

    #[test]
    fn displays_arguments() {
        let args = Arguments::try_parse_from(["milestone-check", "catalog"]).unwrap();
        let display = args.to_string();
        assert!(display.contains("log_filter: warn\n"));
        assert!(display.contains("catalog: None\n"));
        assert!(display.contains("command: Catalog\n"));
    }
}
