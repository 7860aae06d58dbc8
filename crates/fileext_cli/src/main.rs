//! `fileext` command line entry point.
//!
//! # Responsibility
//! - Build an `ExtensionRegistrar` from flags and/or a JSON manifest.
//! - Apply it for the current user or all users, or print the plan.

use clap::Parser;
use fileext_core::{
    default_log_level, flush_logging, init_logging, is_well_known_perceived_type,
    AssociationManifest, ExtensionRegistrar, RegistryRoot, RegistryView,
};
use log::{error, info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Associate a file extension with program ids in the Windows registry.
#[derive(Debug, Parser)]
#[command(name = "fileext", version)]
struct Cli {
    /// Dot-prefixed extension, e.g. `.foo`. Overrides the manifest value.
    extension: Option<String>,

    /// JSON manifest describing the association.
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Program id opened by default.
    #[arg(long, value_name = "ID")]
    default_program_id: Option<String>,

    /// MIME type written as `Content Type`.
    #[arg(long, value_name = "MIME")]
    content_type: Option<String>,

    /// Shell category written as `PerceivedType`.
    #[arg(long, value_name = "TYPE")]
    perceived_type: Option<String>,

    /// Additional program id for "Open with"; repeatable.
    #[arg(long = "open-with", value_name = "ID")]
    open_with: Vec<String>,

    /// Register under HKEY_LOCAL_MACHINE (requires an elevated process).
    #[arg(long)]
    all_users: bool,

    /// Registry view: native, 32 or 64.
    #[arg(long, default_value = "32", value_parser = parse_view)]
    view: RegistryView,

    /// Print the planned writes without touching the registry.
    #[arg(long)]
    dry_run: bool,

    /// Absolute directory for rolling log files.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = run(cli);
    let code = match &result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = error_chain(err.as_ref());
            error!("event=cli_exit module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

/// Joins an error and all of its sources with `: `.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let registrar = build_registrar(&cli)?;
    if let Some(perceived_type) = registrar.perceived_type.as_deref() {
        if !perceived_type.trim().is_empty() && !is_well_known_perceived_type(perceived_type) {
            warn!(
                "event=cli_input module=cli status=warn reason=unknown_perceived_type extension={}",
                registrar.extension()
            );
            eprintln!("warning: `{perceived_type}` is not a documented perceived type");
        }
    }

    let root = if cli.all_users {
        RegistryRoot::LocalMachine
    } else {
        RegistryRoot::CurrentUser
    };

    if cli.dry_run {
        println!("{root} (view {}):", cli.view.as_str());
        for write in registrar.write_plan() {
            println!("  {write}");
        }
        return Ok(());
    }

    apply(&registrar, root, cli.view)?;
    info!(
        "event=cli_apply module=cli status=ok scope={} extension={}",
        root,
        registrar.extension()
    );
    println!("registered {} under {root}", registrar.extension());
    Ok(())
}

fn build_registrar(cli: &Cli) -> Result<ExtensionRegistrar, Box<dyn Error>> {
    let mut manifest = match &cli.manifest {
        Some(path) => AssociationManifest::load(path)?,
        None => AssociationManifest {
            extension: cli
                .extension
                .clone()
                .ok_or("an extension argument or --manifest is required")?,
            content_type: None,
            perceived_type: None,
            default_program_id: None,
            open_with_program_ids: Vec::new(),
        },
    };

    if let Some(extension) = &cli.extension {
        manifest.extension = extension.clone();
    }
    if let Some(value) = &cli.default_program_id {
        manifest.default_program_id = Some(value.clone());
    }
    if let Some(value) = &cli.content_type {
        manifest.content_type = Some(value.clone());
    }
    if let Some(value) = &cli.perceived_type {
        manifest.perceived_type = Some(value.clone());
    }
    manifest
        .open_with_program_ids
        .extend(cli.open_with.iter().cloned());

    Ok(manifest.into_registrar()?)
}

#[cfg(windows)]
fn apply(
    registrar: &ExtensionRegistrar,
    root: RegistryRoot,
    view: RegistryView,
) -> Result<(), Box<dyn Error>> {
    let store = fileext_core::WinRegistryStore::new(view);
    match root {
        RegistryRoot::CurrentUser => registrar.apply_for_current_user(&store)?,
        RegistryRoot::LocalMachine => {
            registrar.apply_for_all_users(&store, &fileext_core::ProcessPrivilege)?
        }
    }
    Ok(())
}

#[cfg(not(windows))]
fn apply(
    _registrar: &ExtensionRegistrar,
    _root: RegistryRoot,
    _view: RegistryView,
) -> Result<(), Box<dyn Error>> {
    Err("the Windows registry is not available on this platform; use --dry-run".into())
}

fn parse_view(value: &str) -> Result<RegistryView, String> {
    RegistryView::parse(value).ok_or_else(|| format!("unknown registry view `{value}`"))
}
