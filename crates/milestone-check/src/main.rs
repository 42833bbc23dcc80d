use {
    clap::Parser,
    milestone_check::{arguments::Arguments, run},
    std::process::ExitCode,
};

fn main() -> ExitCode {
    let args = Arguments::parse();
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::info!("running milestone-check with validated arguments:\n{}", args);

    match run(&args) {
        Ok(outcome) => {
            println!("{}", outcome.output);
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            tracing::error!(?err, "milestone-check failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
