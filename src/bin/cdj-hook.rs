// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use cdj_hook::{
    block::MarkedBlock,
    config::{HookEnv, HookSettings},
    lifecycle::{hook_status, install_hook, uninstall_hook, InstallOptions},
    path::default_settings_path,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "cdj-hook [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Install(opts) => run_install(opts),
            Command::Uninstall(opts) => run_uninstall(opts),
            Command::Print => run_print(),
            Command::Status => run_status(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Install or upgrade cdj shell hook.
    #[command(override_usage = "cdj-hook install [options]")]
    Install(InstallArgs),

    /// Remove cdj shell hook from shell configuration files.
    #[command(override_usage = "cdj-hook uninstall [options]")]
    Uninstall(UninstallArgs),

    /// Print cdj shell hook to stdout.
    Print,

    /// Show which shell configuration files hold the cdj shell hook.
    Status,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InstallArgs {
    /// Shell configuration file to try before detected candidates.
    #[arg(short, long, value_name = "path")]
    pub rc_file: Option<PathBuf>,

    /// Install even if CI, ignore-scripts, or hook settings say to skip.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UninstallArgs {
    /// Additional shell configuration files to clean.
    #[arg(short, long, value_name = "path")]
    pub rc_file: Vec<PathBuf>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    // INVARIANT: Hook setup is a convenience, so it never fails a package
    //   install or uninstall.
    if let Err(error) = run() {
        error!("{error:?}");
    }

    exit(0)
}

fn run() -> Result<()> {
    // INVARIANT: Usage errors are logged, not turned into a non-zero exit.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            err.print()?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    cli.run()
}

fn run_install(args: InstallArgs) -> Result<()> {
    let env = HookEnv::from_env()?;
    let settings = match default_settings_path().map(HookSettings::load) {
        Ok(Ok(settings)) => settings,
        Ok(Err(err)) => {
            warn!("ignore hook settings: {err}");
            HookSettings::default()
        }
        Err(err) => {
            warn!("ignore hook settings: {err}");
            HookSettings::default()
        }
    };

    let opts = InstallOptions {
        rc_file: args.rc_file,
        force: args.force,
        ..Default::default()
    }
    .with_settings(&settings.settings);

    let report = install_hook(&env, &opts, &MarkedBlock::default());
    print!("{report}");

    Ok(())
}

fn run_uninstall(args: UninstallArgs) -> Result<()> {
    let env = HookEnv::from_env()?;
    let report = uninstall_hook(&env, &args.rc_file, &MarkedBlock::default());
    print!("{report}");

    Ok(())
}

fn run_print() -> Result<()> {
    println!("{}", MarkedBlock::default());

    Ok(())
}

fn run_status() -> Result<()> {
    let env = HookEnv::from_env()?;
    for status in hook_status(&env, &MarkedBlock::default()) {
        println!("{status}");
    }

    Ok(())
}
