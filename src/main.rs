use anyhow::Result;
use crossterm::style::Stylize;

use catalog_cli::config::Config;
use catalog_cli::ui::classic::run_classic;
use catalog_cli::ui::list_presenter::ListPresenter;
use catalog_cli::ui::table_display::{display_characters, display_json};
use catalog_cli::ui::tui_app::run_tui;
use catalog_cli::utils::{dual_logging, logging};

fn print_usage() {
    println!("{}", "Catalog CLI - browse and search the character catalog".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  catalog-cli [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}          - Line-mode REPL instead of the full-screen UI", "--classic".green());
    println!("  {}   - Search once, print the results and exit", "--search <name>".green());
    println!("  {}             - List every character once and exit", "--list".green());
    println!("  {}             - With --search/--list, print JSON", "--json".green());
    println!("  {} - Use this catalog endpoint", "--endpoint <url>".green());
    println!("  {}  - Write the commented default config", "--generate-config".green());
    println!("  {}             - Show this help", "--help".green());
    println!();
    println!("{}", "Environment:".yellow());
    println!("  CATALOG_API_URL    - Endpoint override (below --endpoint)");
    println!("  RUST_LOG           - Log filter, e.g. catalog=trace");
    println!("  CATALOG_CLI_DEBUG  - Mirror log lines to stderr");
    println!();
}

/// Value following `flag`. Another `--flag` in that slot is not a value.
fn flag_value(args: &[String], flag: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    match args.get(pos + 1) {
        Some(value) if !value.starts_with("--") => Ok(Some(value.clone())),
        _ => anyhow::bail!("{} requires a value", flag),
    }
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize the catalog CLI.");
    Ok(())
}

fn load_config(args: &[String]) -> Result<Config> {
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(target: "config", "Falling back to default config: {}", e);
        Config::default()
    });

    let mut config = config.with_env_overrides();
    if let Some(endpoint) = flag_value(args, "--endpoint")? {
        config.api.endpoint = endpoint;
    }
    tracing::info!(target: "config", "Using catalog endpoint {}", config.api.endpoint);
    Ok(config)
}

/// Non-interactive mode: one fetch, print, exit non-zero on failure
fn run_once(
    presenter: &ListPresenter,
    runtime: &tokio::runtime::Runtime,
    config: &Config,
    term: Option<String>,
    json: bool,
) -> Result<()> {
    match term {
        Some(term) => {
            presenter.set_search_term(term);
            runtime.block_on(presenter.submit_search());
        }
        None => runtime.block_on(presenter.load_initial()),
    }

    let view = presenter.snapshot();
    if !view.error_message.is_empty() {
        eprintln!("{}", view.error_message.red());
        std::process::exit(1);
    }

    if json {
        display_json(&view.characters)?;
    } else {
        display_characters(
            &view.characters,
            view.page_info.as_ref(),
            &config.display.icons,
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        return generate_config();
    }

    let log_buffer = logging::init_tracing_with_dual_logging();

    let config = load_config(&args)?;
    let presenter = catalog_cli::build_presenter(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;

    let json = args.contains(&"--json".to_string());
    if let Some(term) = flag_value(&args, "--search")? {
        return run_once(&presenter, &runtime, &config, Some(term), json);
    }
    if args.contains(&"--list".to_string()) {
        return run_once(&presenter, &runtime, &config, None, json);
    }

    if let Some(file) = dual_logging::get_file_logger() {
        eprintln!("Debug logs will be written to:");
        eprintln!("   {}", file.log_path().display());
        eprintln!("   Tail with: tail -f {}", file.log_path().display());
        eprintln!();
    }

    if args.contains(&"--classic".to_string()) {
        return run_classic(presenter, &runtime, &config);
    }

    run_tui(presenter, runtime.handle().clone(), config, Some(log_buffer))
}
