use std::{io, path::PathBuf};

use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};
use diffview_config::Config;
use diffview_notes::Version;
use miette::Result;
use tracing::Level;

use crate::state::{RunType, State};

mod config;
mod diff;
mod fs;
mod notes;
mod state;

/// Parse the command line and run whatever was asked for.
///
/// # Errors
///
/// Anything that goes wrong is rendered as a diagnostic by `main`.
pub fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(Config::FILE_NAME));
    let state = config::load(&config_path)?;
    let mut stdout = io::stdout().lock();

    match matches.subcommand() {
        Some(("notes", notes)) => run_notes(notes, &state, &mut stdout)?,
        Some(("diff", diff)) => diff::run(
            diff.get_one::<PathBuf>("input").map(PathBuf::as_path),
            diff::Format {
                long: diff.get_flag("long"),
                include_headers: diff.get_flag("headers") || state.config.diff.include_headers,
            },
            &state,
            &mut stdout,
        )?,
        Some(("config", _)) => config::show(&state, &mut stdout)?,
        _ => {}
    }
    Ok(())
}

fn run_notes(matches: &ArgMatches, state: &State, stdout: &mut impl io::Write) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => notes::list(state, stdout)?,
        Some(("show", show)) => {
            if let Some(version) = show.get_one::<Version>("version") {
                notes::show(state, version, stdout)?;
            }
        }
        Some(("upgrade", upgrade)) => {
            if let Some(to) = upgrade.get_one::<Version>("to") {
                notes::upgrade(state, upgrade.get_one::<Version>("from"), to, stdout)?;
            }
        }
        Some(("add", add)) => {
            if let Some(version) = add.get_one::<Version>("version") {
                let source = add.get_one::<PathBuf>("file").map(PathBuf::as_path);
                let version = if add.get_flag("dry-run") {
                    RunType::DryRun(version)
                } else {
                    RunType::Real(version)
                };
                notes::add(state, version, source)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn version_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .value_name("VERSION")
        .value_parser(|version: &str| version.parse::<Version>())
}

fn build_cli() -> Command {
    command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .env("DIFFVIEW_CONFIG")
                .help("The config file to use. Paths in it are relative to its directory.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Print extra information about what's happening.")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("notes")
                .about("Read and publish release notes.")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List every version that has a note."))
                .subcommand(
                    Command::new("show")
                        .about("Print the note for a single version exactly as it was written.")
                        .arg(version_arg("version").required(true)),
                )
                .subcommand(
                    Command::new("upgrade")
                        .about("Print every note someone upgrading should see.")
                        .arg(
                            version_arg("from")
                                .long("from")
                                .help("The version being upgraded from, leave out for a fresh install."),
                        )
                        .arg(
                            version_arg("to")
                                .long("to")
                                .required(true)
                                .help("The version being upgraded to."),
                        ),
                )
                .subcommand(
                    Command::new("add")
                        .about("Publish the note for a new version. Notes can never be changed.")
                        .arg(version_arg("version").required(true))
                        .arg(
                            Arg::new("file")
                                .long("file")
                                .short('f')
                                .value_name("PATH")
                                .help("Read the note from this file instead of stdin.")
                                .value_parser(value_parser!(PathBuf)),
                        )
                        .arg(
                            Arg::new("dry-run")
                                .long("dry-run")
                                .help("Pretend to publish, printing what would happen.")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("List the hunks of a Git diff.")
                .arg(
                    Arg::new("input")
                        .value_name("PATH")
                        .help("The diff to read, defaults to stdin.")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("headers")
                        .long("headers")
                        .help("Also list the start of each changed file.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("long")
                        .long("long")
                        .help("Describe each hunk over several lines.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("config").about("Print the config in use, defaults included."))
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

#[cfg(test)]
mod test_cli {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli().debug_assert();
    }
}
