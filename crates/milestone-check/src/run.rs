use {
    crate::{
        arguments::{Arguments, Command},
        config::Configuration,
    },
    anyhow::{Context, Result},
    milestones::{
        Catalog,
        Clock,
        FixedClock,
        MilestoneSet,
        MilestoneUpdateRequest,
        Policy,
        SystemClock,
        business_days_between,
    },
    serde::de::DeserializeOwned,
    std::{path::Path, sync::Arc},
};

/// What the command prints and whether it should exit successfully.
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn success(output: String) -> Self {
        Self {
            output,
            success: true,
        }
    }
}

pub fn run(args: &Arguments) -> Result<Outcome> {
    let configuration = match &args.config {
        Some(path) => Configuration::from_path(path)?,
        None => Configuration::default(),
    };

    match &args.command {
        Command::Validate {
            milestones,
            request,
        } => {
            let clock: Arc<dyn Clock> = match args.today {
                Some(today) => Arc::new(FixedClock(today)),
                None => Arc::new(SystemClock),
            };
            let policy = Policy::new(
                configuration.policy.clone(),
                Arc::new(load_catalog(args, &configuration)?),
                clock,
            );
            let existing: MilestoneSet = read_json(milestones)?;
            let request: MilestoneUpdateRequest = read_json(request)?;

            let result = policy.validate(&existing, &request);
            if !result.is_valid {
                tracing::warn!(
                    shipment_ref = %request.shipment_ref,
                    phase = %request.phase,
                    errors = ?result.field_errors,
                    "milestone update rejected"
                );
            }
            Ok(Outcome {
                output: serde_json::to_string_pretty(&result)?,
                success: result.is_valid,
            })
        }
        Command::BusinessDays { start, end } => Ok(Outcome::success(
            business_days_between(*start, *end).to_string(),
        )),
        Command::Gaps { milestones } => {
            let existing: MilestoneSet = read_json(milestones)?;
            Ok(Outcome::success(serde_json::to_string_pretty(
                &existing.gaps(),
            )?))
        }
        Command::Catalog => {
            let catalog = load_catalog(args, &configuration)?;
            Ok(Outcome::success(serde_json::to_string_pretty(
                catalog.groups(),
            )?))
        }
    }
}

fn load_catalog(args: &Arguments, configuration: &Configuration) -> Result<Catalog> {
    match args.catalog.as_ref().or(configuration.catalog.as_ref()) {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("failed to load catalog {}", path.display())),
        None => Catalog::builtin().context("bundled exception code catalog is invalid"),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        clap::Parser,
        serde_json::{Value, json},
        std::path::PathBuf,
        tempfile::TempDir,
    };

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            observe::tracing::initialize_reentrant("milestones=debug,milestone_check=debug");
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn write(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, contents).unwrap();
            path
        }

        fn write_json(&self, name: &str, value: Value) -> PathBuf {
            self.write(name, &value.to_string())
        }
    }

    fn run_with(args: &[&str]) -> Result<Outcome> {
        let args = Arguments::try_parse_from(
            std::iter::once("milestone-check").chain(args.iter().copied()),
        )
        .unwrap();
        run(&args)
    }

    fn path(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn validate_requires_exception_code() {
        let workspace = Workspace::new();
        let milestones = workspace.write_json(
            "milestones.json",
            json!({
                "revalidation": "2024-04-29 10:00:00",
                "lastDocument": "2024-05-01T09:30:00",
                "msa": null,
                "transportDelivery": "2024-05-10",
            }),
        );
        let request = workspace.write_json(
            "request.json",
            json!({
                "shipmentRef": "3AB-240001",
                "phase": "130",
                "proposedDate": "2024-05-10",
            }),
        );

        let outcome = run_with(&[
            "--today",
            "2024-06-03",
            "validate",
            "--milestones",
            path(&milestones),
            "--request",
            path(&request),
        ])
        .unwrap();

        assert!(!outcome.success);
        let output: Value = serde_json::from_str(&outcome.output).unwrap();
        assert_eq!(output["isValid"], false);
        assert_eq!(
            output["fieldErrors"]["exceptionCode"],
            "7 business days between phase 114 and phase 130 reach the 7 day threshold, an \
             exception code is required"
        );
        assert!(output["fieldErrors"].get("date").is_none());
    }

    #[test]
    fn validate_accepts_bundled_code() {
        let workspace = Workspace::new();
        let milestones = workspace.write_json(
            "milestones.json",
            json!({ "lastDocument": "2024-05-01", "transportDelivery": "2024-05-10" }),
        );
        let request = workspace.write_json(
            "request.json",
            json!({
                "shipmentRef": "3AB-240001",
                "phase": "130",
                "proposedDate": "2024-05-10",
                "exceptionCode": "BA02",
            }),
        );

        let outcome = run_with(&[
            "--today",
            "2024-06-03",
            "validate",
            "--milestones",
            path(&milestones),
            "--request",
            path(&request),
        ])
        .unwrap();

        assert!(outcome.success, "{}", outcome.output);
    }

    #[test]
    fn malformed_values_become_field_errors() {
        let workspace = Workspace::new();
        let milestones = workspace.write_json(
            "milestones.json",
            json!({ "lastDocument": "2024-05-01", "msa": 5, "transportDelivery": "2024-05-10" }),
        );
        let request = workspace.write_json(
            "request.json",
            json!({
                "shipmentRef": "3AB-240001",
                "phase": "130",
                "proposedDate": "2024-05-10",
                "exceptionCode": "ba02",
            }),
        );

        let outcome = run_with(&[
            "--today",
            "2024-06-03",
            "validate",
            "--milestones",
            path(&milestones),
            "--request",
            path(&request),
        ])
        .unwrap();

        assert!(!outcome.success);
        let output: Value = serde_json::from_str(&outcome.output).unwrap();
        assert_eq!(
            output["fieldErrors"],
            json!({
                "exceptionCode": "exception code \"ba02\" must be two uppercase letters followed \
                                  by two digits",
            })
        );
        assert_eq!(
            output["violations"],
            json!([{ "kind": "invalidExceptionCode", "code": "ba02" }])
        );
    }

    #[test]
    fn configuration_and_catalog_files() {
        let workspace = Workspace::new();
        workspace.write(
            "codes.json",
            r#"[{"causaGlobal": "Cliente", "causaPuntual": [
                {"value": "XY01", "label": "Retenido"}
            ]}]"#,
        );
        let config = workspace.write(
            "milestones.toml",
            "catalog = \"codes.json\"\n\n[policy]\nexception-threshold = 4\n",
        );
        let milestones = workspace.write_json(
            "milestones.json",
            json!({ "lastDocument": "2024-05-01", "msa": "2024-05-07" }),
        );
        let request = workspace.write_json(
            "request.json",
            json!({
                "shipmentRef": "3AB-240001",
                "phase": "138",
                "proposedDate": "2024-05-07",
                "exceptionCode": "BA02",
            }),
        );

        let outcome = run_with(&[
            "--today",
            "2024-06-03",
            "--config",
            path(&config),
            "validate",
            "--milestones",
            path(&milestones),
            "--request",
            path(&request),
        ])
        .unwrap();

        // BA02 is bundled but not part of the configured catalog.
        let output: Value = serde_json::from_str(&outcome.output).unwrap();
        assert_eq!(
            output["fieldErrors"]["exceptionCode"],
            "exception code BA02 is not in the catalog"
        );

        let catalog = run_with(&["--config", path(&config), "catalog"]).unwrap();
        let catalog: Value = serde_json::from_str(&catalog.output).unwrap();
        assert_eq!(catalog[0]["causaPuntual"][0]["value"], "XY01");
    }

    #[test]
    fn business_days_command() {
        let outcome = run_with(&["business-days", "2024-05-10", "2024-05-13"]).unwrap();
        assert_eq!(outcome.output, "1");
        assert!(outcome.success);

        let outcome = run_with(&["business-days", "2024-05-13", "2024-05-10"]).unwrap();
        assert_eq!(outcome.output, "0");
    }

    #[test]
    fn gaps_command() {
        let workspace = Workspace::new();
        let milestones = workspace.write_json(
            "milestones.json",
            json!({ "revalidation": "2024-04-26", "lastDocument": "2024-05-01", "msa": "" }),
        );

        let outcome = run_with(&["gaps", "--milestones", path(&milestones)]).unwrap();
        let output: Value = serde_json::from_str(&outcome.output).unwrap();
        assert_eq!(
            output,
            json!([{ "from": "073", "to": "114", "businessDays": 3 }])
        );
    }

    #[test]
    fn bundled_catalog_by_default() {
        let outcome = run_with(&["catalog"]).unwrap();
        let catalog: Value = serde_json::from_str(&outcome.output).unwrap();
        assert!(!catalog.as_array().unwrap().is_empty());
    }

    #[test]
    fn unreadable_inputs_are_errors() {
        let workspace = Workspace::new();
        let milestones = workspace.write("milestones.json", "{ not json");

        let err = run_with(&["gaps", "--milestones", path(&milestones)]).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse"));

        let missing = workspace.dir.path().join("missing.json");
        let err = run_with(&["gaps", "--milestones", path(&missing)]).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));

        let err = run_with(&["--catalog", path(&missing), "catalog"]).unwrap_err();
        assert!(err.to_string().starts_with("failed to load catalog"));
    }
}
