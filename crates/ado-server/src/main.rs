use ado_schema::{AdoValidator, ApplicationDefinition, GenerationRequest, StyleFramework};
use ado_server::{build_pipeline, init_tracing, serve, write_generation, ServerConfig};
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::net::SocketAddr;
use std::path::PathBuf;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Path to a TOML configuration file");

    Command::new("ado-server")
        .version(ado_server::VERSION)
        .about("Prompt-to-project generation server")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Serve the HTTP and WebSocket endpoints")
                .arg(config_arg.clone())
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_parser(value_parser!(SocketAddr))
                        .help("Listen address, overrides the config file"),
                )
                .arg(
                    Arg::new("json-logs")
                        .long("json-logs")
                        .action(ArgAction::SetTrue)
                        .help("Emit logs as JSON lines"),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a project once and print the response as JSON")
                .arg(config_arg)
                .arg(
                    Arg::new("prompt")
                        .long("prompt")
                        .short('p')
                        .required(true)
                        .help("What to build"),
                )
                .arg(
                    Arg::new("framework")
                        .long("framework")
                        .default_value("react")
                        .help("Target framework tag"),
                )
                .arg(
                    Arg::new("style")
                        .long("style")
                        .default_value("tailwindcss")
                        .help("Styling framework"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate an application definition JSON file")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Definition file"),
                ),
        )
}

fn load_config(args: &ArgMatches) -> anyhow::Result<ServerConfig> {
    let path = args.get_one::<PathBuf>("config");
    Ok(ServerConfig::load(path.map(PathBuf::as_path))?)
}

async fn run_generate(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let prompt = args.get_one::<String>("prompt").context("--prompt is required")?;
    let framework = args
        .get_one::<String>("framework")
        .map_or("react", String::as_str);
    let style: StyleFramework = args
        .get_one::<String>("style")
        .map_or("tailwindcss", String::as_str)
        .parse()?;

    let pipeline = build_pipeline(&config)?;
    let request = GenerationRequest::new(prompt.as_str())
        .with_framework(framework)
        .with_style(style);
    let response = write_generation(&pipeline, &request, &mut std::io::stdout().lock()).await?;
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

fn run_validate(args: &ArgMatches) -> anyhow::Result<()> {
    let path = args.get_one::<PathBuf>("file").context("file is required")?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let ado: ApplicationDefinition = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid definition", path.display()))?;

    let issues = AdoValidator::new().validate(&ado);
    if issues.is_empty() {
        println!("{}: valid ({} files)", ado.name, ado.files.len());
        return Ok(());
    }

    println!("{}: {} issue(s)", ado.name, issues.len());
    for issue in &issues {
        println!("  - {issue}");
    }
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("serve", args)) => {
            let mut config = load_config(args)?;
            if let Some(bind) = args.get_one::<SocketAddr>("bind") {
                config = config.with_bind(*bind);
            }
            init_tracing(config.log_json || args.get_flag("json-logs"));
            serve(config).await
        }
        Some(("generate", args)) => {
            init_tracing(false);
            run_generate(args).await
        }
        Some(("validate", args)) => run_validate(args),
        _ => Ok(()),
    }
}
