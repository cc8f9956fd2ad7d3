//! pi-cloud-init - main entry point

use anyhow::Context;
use pi_cloud_init::cli::Cli;
use pi_cloud_init::{
    EnvMap, NoPrompt, OutputTarget, Prompter, SecretMaterializer, TerminalPrompter, output,
};
use std::io::IsTerminal;
use std::process::ExitCode;

/// Initialize logging to stderr, filtered by `PI_CLOUD_INIT_LOG`
fn init_logger() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PI_CLOUD_INIT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logger();

    let cli = Cli::parse_args();
    tracing::debug!("CLI arguments parsed");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            for cause in e.chain() {
                eprintln!("{cause}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let flags = cli.flag_map();
    let env = EnvMap::capture();

    let interactive = !cli.non_interactive && std::io::stdin().is_terminal();
    let mut prompter: Box<dyn Prompter> = if interactive {
        Box::new(TerminalPrompter::new())
    } else {
        tracing::info!("Running without prompts");
        Box::new(NoPrompt)
    };

    let (config, documents) = pi_cloud_init::generate(
        &flags,
        &env,
        prompter.as_mut(),
        SecretMaterializer::new(),
    )
    .context("Failed to generate cloud-init documents")?;

    let target = OutputTarget::from_config(&config);
    output::emit(&documents, &target, &mut std::io::stdout().lock())
        .context("Failed to output cloud-init documents")?;

    if let OutputTarget::Directory(dir) = &target {
        eprintln!(
            "Wrote {} and {} to {}",
            output::USER_DATA_FILE,
            output::NETWORK_CONFIG_FILE,
            dir.display()
        );
    }
    Ok(())
}
