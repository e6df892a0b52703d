//! Purpose: `magicsess` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs one session per command, emits JSON on stdout.
//! Invariants: Errors are emitted on stderr (text on a TTY, JSON otherwise).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Every session opened here is closed before the command returns.
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use magicsess::api::{
    Cookie, Error, ErrorKind, Flags, Param, Session, SessionConfig, lsmodes, lsparams,
    to_exit_code,
};

#[derive(Parser)]
#[command(
    name = "magicsess",
    version,
    about = "Identify file types through a validated libmagic session",
    long_about = None,
    after_help = r#"EXAMPLES
  $ magicsess check /usr/share/dict/words
  $ magicsess check --mode raw .
  $ magicsess check --db /usr/share/file/misc/magic.mgc --param NAME_MAX=100 report.pdf
  $ printf '%PDF-1.3\r\n' | magicsess buffer
  $ magicsess modes

Set RUST_LOG=debug to trace session open/load/close events on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone, Debug, Default)]
struct SessionArgs {
    #[arg(long, help = "Signature database (default: libmagic's compiled-in database)", value_hint = ValueHint::FilePath)]
    db: Option<PathBuf>,
    #[arg(
        long,
        help = "Detection flags: a number (1106, 0x452) or names joined by '|' (MAGIC_MIME|raw)"
    )]
    mode: Option<String>,
    #[arg(
        long = "param",
        value_name = "NAME=VALUE",
        help = "Parameter override, e.g. NAME_MAX=100 (repeatable)"
    )]
    params: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Classify a file")]
    Check {
        #[arg(value_hint = ValueHint::AnyPath)]
        file: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
    },
    #[command(about = "Classify bytes read from stdin")]
    Buffer {
        #[command(flatten)]
        session: SessionArgs,
    },
    #[command(about = "Dump the loaded signature set to stdout")]
    List {
        #[command(flatten)]
        session: SessionArgs,
    },
    #[command(about = "Print detection flag names and values")]
    Modes,
    #[command(about = "Print parameter names and ids")]
    Params,
    #[command(about = "Print version information")]
    Version,
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Serialize)]
struct Classification<'a> {
    file: &'a Path,
    result: Option<String>,
    flags: u32,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli.command) {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn dispatch(command: Command) -> Result<i32, Error> {
    match command {
        Command::Modes => {
            emit_json(json!(lsmodes()));
            Ok(0)
        }
        Command::Params => {
            emit_json(json!(lsparams()));
            Ok(0)
        }
        Command::Version => {
            emit_json(json!({
                "name": "magicsess",
                "version": env!("CARGO_PKG_VERSION"),
                "libmagic": libmagic_version(),
            }));
            Ok(0)
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "magicsess", &mut io::stdout());
            Ok(0)
        }
        command => dispatch_engine(command),
    }
}

#[cfg(has_libmagic)]
fn dispatch_engine(command: Command) -> Result<i32, Error> {
    run_engine_command::<magicsess::api::MagicCookie>(command)
}

#[cfg(not(has_libmagic))]
fn dispatch_engine(_command: Command) -> Result<i32, Error> {
    Err(Error::new(ErrorKind::EngineInit).with_message("magicsess was built without libmagic"))
}

#[cfg(has_libmagic)]
fn libmagic_version() -> Option<String> {
    Some(magicsess::api::engine_version())
}

#[cfg(not(has_libmagic))]
fn libmagic_version() -> Option<String> {
    None
}

#[cfg_attr(not(has_libmagic), allow(dead_code))]
fn run_engine_command<C: Cookie>(command: Command) -> Result<i32, Error> {
    match command {
        Command::Check { file, session } => {
            let mut session = open_session::<C>(&file, &session)?;
            let result = session.classify_file();
            let flags = session.flags();
            session.close();
            let classification = Classification {
                file: &file,
                result: result?,
                flags: flags.bits(),
            };
            let value = serde_json::to_value(&classification).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to encode result")
                    .with_path(&file)
                    .with_source(err)
            })?;
            emit_json(value);
            Ok(0)
        }
        Command::Buffer { session } => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            let mut session = open_session::<C>(Path::new("-"), &session)?;
            let result = session.classify_buffer(&bytes);
            session.close();
            emit_json(json!({ "bytes": bytes.len(), "result": result? }));
            Ok(0)
        }
        Command::List { session } => {
            let mut session = open_session::<C>(Path::new("-"), &session)?;
            let status = session.list_signatures();
            session.close();
            match status? {
                0 => Ok(0),
                status => Err(Error::new(ErrorKind::Engine)
                    .with_message(format!("signature listing failed (status {status})"))),
            }
        }
        Command::Modes | Command::Params | Command::Version | Command::Completion { .. } => {
            dispatch(command)
        }
    }
}

#[cfg_attr(not(has_libmagic), allow(dead_code))]
fn open_session<C: Cookie>(file: &Path, args: &SessionArgs) -> Result<Session<C>, Error> {
    let mut config = SessionConfig::new(file)?;
    if let Some(db) = &args.db {
        config = config.with_database(db);
    }
    if let Some(mode) = &args.mode {
        config = config.with_flags(mode.parse::<Flags>()?);
    }
    for raw in &args.params {
        let (param, value) = parse_param_override(raw)?;
        config = config.with_param(param, value);
    }
    Session::open(config)
}

#[cfg_attr(not(has_libmagic), allow(dead_code))]
fn parse_param_override(raw: &str) -> Result<(Param, usize), Error> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        Error::new(ErrorKind::Configuration)
            .with_message(format!("expected NAME=VALUE, got {raw}"))
    })?;
    let param = name.parse::<Param>()?;
    let value = value.trim().parse::<usize>().map_err(|err| {
        Error::new(ErrorKind::Configuration)
            .with_message(format!("invalid value for {param}: {value}"))
            .with_source(err)
    })?;
    Ok((param, value))
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        return;
    }
    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Engine\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_causes(err: &Error) -> Vec<String> {
    use std::error::Error as _;
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(err.kind().as_str()));
    if let Some(message) = err.message() {
        inner.insert("message".to_string(), json!(message));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}
