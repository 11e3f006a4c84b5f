use clap::Parser;
use page_studio::cli::commands::{cmd_condense, cmd_recent, cmd_tree, cmd_validate, cmd_xpath};
use page_studio::cli::config::{
    Cli, Commands, build_condense_options, load_config, resolve_settings_path,
};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let settings_path = resolve_settings_path(cli.settings.as_deref(), &config);

    let output = match cli.command {
        Commands::Tree { project, search } => cmd_tree(&project, &search, &settings_path)?,
        Commands::Xpath {
            source,
            query,
            xpath_version,
            json,
            expand_all,
        } => {
            // Resolve version: CLI > config
            let version = xpath_version.unwrap_or_else(|| config.xpath.version.clone());
            cmd_xpath(&source, &query, &version, json, expand_all)?
        }
        Commands::Condense {
            recording,
            output,
            no_xml,
            no_screenshot,
            threshold,
        } => {
            let options =
                build_condense_options(&config.condense, no_xml, no_screenshot, threshold)?;
            cmd_condense(&recording, output.as_deref(), &options, cli.verbose)?
        }
        Commands::Validate {
            project,
            page,
            state,
            platform,
            locators,
            promote,
            output,
        } => cmd_validate(
            &project,
            &page,
            state.as_deref(),
            &platform,
            &locators,
            promote,
            output.as_deref(),
            &settings_path,
        )?,
        Commands::Recent => cmd_recent(&settings_path)?,
    };

    print!("{}", output);
    Ok(())
}
