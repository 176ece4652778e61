use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use keysticks_control::InputControl;
use keysticks_profile::StateVector;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Load a profile, drop everything that does not fit and report it.
    Check {
        /// The profile to check
        profile: PathBuf,
    },
    /// Show the actions a control runs in a situation.
    Resolve {
        /// The profile to query
        profile: PathBuf,
        /// Situation as mode,page,cell (`*` for any)
        #[arg(short, long)]
        situation: StateVector,
        /// Control such as `button1` or `stick1.left`
        #[arg(short, long)]
        control: InputControl,
        /// Do not fall back to broader situations
        #[arg(long)]
        exact: bool,
    },
    /// Show every control bound in a situation.
    Table {
        /// The profile to query
        profile: PathBuf,
        /// Situation as mode,page,cell (`*` for any)
        #[arg(short, long)]
        situation: StateVector,
        /// Do not fall back to broader situations
        #[arg(long)]
        exact: bool,
    },
    /// Show the grid bindings of a mode.
    Grid {
        /// The profile to query
        profile: PathBuf,
        /// Mode id
        #[arg(short, long)]
        mode: u32,
        /// Situation the relative bindings are resolved against
        #[arg(short, long)]
        situation: Option<StateVector>,
    },
    /// Check the profile again on every change.
    Watch {
        /// The profile to watch
        profile: PathBuf,
    },
}

/// Load, check and query keysticks profiles.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
