//! # scriptbridge
//!
//! Command line front end for the scriptbridge interpreters.
//!
//! ```text
//!   scriptbridge [--language <name>] [--config <path>] <command>
//!
//!        run <file>        parse a script file and run it
//!        eval <source>     evaluate a snippet and print its value
//!        new <name>        write an empty script with the backend's header
//!        languages         list the languages this build can serve
//!        methods <class>   describe a configured host class
//! ```
//!
//! ## Configuration
//!
//! Configuration is read from `$XDG_CONFIG_HOME/scriptbridge/config.toml`,
//! created with documented defaults on first use.
//!
//! ## Running
//!
//! ```bash
//! scriptbridge eval "[1, 2].sum"
//!
//! # With debug logging
//! RUST_LOG=debug scriptbridge run hello.rb
//! ```

use anyhow::{Context, Result};
use argh::FromArgs;
use scriptbridge_core::{ScriptInterpreter, ScriptLanguage, ScriptValue};
use scriptbridge_host::{Bridge, Config, ScriptFile};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Run scripts through the configured interpreter.
#[derive(FromArgs, Debug)]
struct Cli {
    #[argh(option, short = 'l')]
    /// script language to use instead of the configured engine, e.g. "ruby"
    language: Option<String>,

    #[argh(option, short = 'c')]
    /// configuration file; defaults to the per-user config.toml
    config: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Command {
    Run(Run),
    Eval(Eval),
    New(New),
    Languages(Languages),
    Methods(Methods),
}

/// Parse a script file and run it.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "run")]
struct Run {
    #[argh(positional)]
    /// path of the script to run
    file: PathBuf,

    #[argh(option, default = "1")]
    /// how many times to run the parsed script
    times: u32,
}

/// Evaluate a snippet and print its value.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "eval")]
struct Eval {
    #[argh(positional, greedy)]
    /// source to evaluate; multiple words are joined with spaces
    source: Vec<String>,
}

/// Write a new script file for the selected language.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "new")]
struct New {
    #[argh(positional)]
    /// script name, without extension
    name: String,

    #[argh(option, default = "PathBuf::from(\".\")")]
    /// directory to write into. Defaults to the current directory.
    dir: PathBuf,
}

/// List the languages this build can serve.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "languages")]
struct Languages {}

/// Describe a host class through the selected interpreter.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "methods")]
struct Methods {
    #[argh(positional)]
    /// class name, as declared in the configuration
    class: String,
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Load first so the configured log level applies; report once logging is up
    let loaded = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    let (config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => (Config::default(), Some(e)),
    };

    init_logging(&config.engine.log_level);
    info!("Starting scriptbridge v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        info!("Failed to load config, using defaults: {:#}", e);
    }

    let bridge = Bridge::from_config(&config);
    let result = execute(&bridge, &cli);
    bridge.shutdown();
    result
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Diagnostics go to stderr so script output stays clean
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(bridge: &Bridge, cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Languages(_) => {
            for language in ScriptLanguage::ALL {
                let status = match bridge.interpreter(language) {
                    Ok(interpreter) if interpreter.language() == language => "available",
                    Ok(_) => "unavailable (runtime not found)",
                    Err(_) => "not configured",
                };
                println!("{:<6} {}", language.as_str(), status);
            }
            Ok(())
        }
        Command::Run(run) => {
            let interpreter = bridge.select(cli.language.as_deref())?;
            run_file(interpreter.as_ref(), run)
        }
        Command::Eval(eval) => {
            let interpreter = bridge.select(cli.language.as_deref())?;
            let source = eval.source.join(" ");
            let value = interpreter
                .run_command(&source)
                .context("Evaluation failed")?;
            print_value(&value);
            Ok(())
        }
        Command::New(new) => {
            let interpreter = bridge.select(cli.language.as_deref())?;
            let path = ScriptFile::new(&new.name).write(&new.dir, interpreter.as_ref())?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Methods(methods) => {
            let interpreter = bridge.select(cli.language.as_deref())?;
            let value = bridge.class_methods(interpreter.as_ref(), &methods.class)?;
            print_value(&value);
            Ok(())
        }
    }
}

fn run_file(interpreter: &dyn ScriptInterpreter, run: &Run) -> Result<()> {
    let path = run
        .file
        .to_str()
        .with_context(|| format!("Script path is not valid UTF-8: {}", run.file.display()))?;

    let parsed = interpreter
        .run_script(path)
        .with_context(|| format!("Failed to load script: {}", path))?;

    if interpreter.language() == ScriptLanguage::None {
        warn!("Scripting is disabled, {} was not run", path);
    }

    for _ in 0..run.times {
        parsed
            .run()
            .with_context(|| format!("Script failed: {}", path))?;
    }
    Ok(())
}

fn print_value(value: &ScriptValue) {
    match value {
        ScriptValue::List(items) => {
            for item in items {
                println!("{}", item);
            }
        }
        value if !value.is_nil() && *value != ScriptValue::empty() => println!("{}", value),
        _ => {}
    }
}
