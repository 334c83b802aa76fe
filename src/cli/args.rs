//! Command-line interface definitions.

use clap::{ColorChoice, CommandFactory, Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::core::AssetKind;
use crate::pipeline::Task;

/// Stagecraft static site asset builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: stagecraft.toml)
    #[arg(short = 'C', long, global = true, default_value = "stagecraft.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Build for production: write to the production root and rewrite asset references
    #[arg(short, long, global = true)]
    pub prod: bool,

    /// Also write a minified `.min.js` next to every script
    #[arg(short, long, global = true)]
    pub min: bool,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands (default: watch)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Clean the output root, then run every pipeline
    #[command(visible_alias = "b")]
    Build,

    /// Build, then serve the development root and rebuild on change
    #[command(visible_alias = "w")]
    Watch,

    /// Delete the output root
    Clean,

    /// Run a single pipeline
    Run {
        #[arg(value_enum)]
        task: TaskArg,
    },
}

/// Independently runnable pipelines.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskArg {
    Markup,
    Styles,
    Scripts,
    Images,
    Vendor,
}

impl From<TaskArg> for Task {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::Markup => Self::Asset(AssetKind::Markup),
            TaskArg::Styles => Self::Asset(AssetKind::Styles),
            TaskArg::Scripts => Self::Asset(AssetKind::Scripts),
            TaskArg::Images => Self::Asset(AssetKind::Images),
            TaskArg::Vendor => Self::Vendor,
        }
    }
}

impl Cli {
    /// Subcommand to run; `watch` when none was given.
    pub fn action(&self) -> Commands {
        self.command.unwrap_or(Commands::Watch)
    }

    /// Parse arguments after dropping unrecognized flags.
    ///
    /// Returns the dropped arguments so they can be reported once logging
    /// is configured.
    pub fn parse_lenient<I, T>(args: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let (kept, dropped) = sanitize_args(args.into_iter().map(Into::into));
        (Self::parse_from(kept), dropped)
    }
}

/// Names the parser understands: long flags, short flags and positional words.
struct KnownArgs {
    longs: Vec<String>,
    shorts: Vec<char>,
    words: Vec<String>,
}

impl KnownArgs {
    fn collect() -> Self {
        let mut command = Cli::command();
        command.build();

        let mut known = Self {
            longs: Vec::new(),
            shorts: Vec::new(),
            words: Vec::new(),
        };
        known.add_args(&command);
        for sub in command.get_subcommands() {
            known.words.push(sub.get_name().to_string());
            known.words.extend(sub.get_all_aliases().map(str::to_string));
            known.add_args(sub);
        }
        known
            .words
            .extend(TaskArg::value_variants().iter().filter_map(|v| {
                v.to_possible_value().map(|p| p.get_name().to_string())
            }));
        known
    }

    fn add_args(&mut self, command: &clap::Command) {
        for arg in command.get_arguments() {
            if let Some(long) = arg.get_long() {
                self.longs.push(long.to_string());
            }
            if let Some(aliases) = arg.get_all_aliases() {
                self.longs.extend(aliases.into_iter().map(str::to_string));
            }
            if let Some(short) = arg.get_short() {
                self.shorts.push(short);
            }
        }
    }

    fn is_known(&self, arg: &str) -> bool {
        if let Some(long) = arg.strip_prefix("--") {
            let name = long.split('=').next().unwrap_or_default();
            return self.longs.iter().any(|l| l == name);
        }
        if let Some(shorts) = arg.strip_prefix('-') {
            // `-C` may carry its value attached (`-Cfoo.toml`).
            let mut chars = shorts.chars();
            while let Some(c) = chars.next() {
                if !self.shorts.contains(&c) {
                    return false;
                }
                if c == 'C' {
                    break;
                }
            }
            return !shorts.is_empty();
        }
        true
    }
}

/// Drop flags the CLI does not define, plus a bare value directly after an
/// unknown long flag unless it is a subcommand or task name.
pub fn sanitize_args(args: impl IntoIterator<Item = OsString>) -> (Vec<OsString>, Vec<String>) {
    let known = KnownArgs::collect();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    let mut args = args.into_iter();
    let mut after_unknown_long = false;
    let mut passthrough = false;

    if let Some(bin) = args.next() {
        kept.push(bin);
    }

    for arg in args {
        let Some(text) = arg.to_str() else {
            kept.push(arg);
            after_unknown_long = false;
            continue;
        };

        if passthrough || text == "-" {
            kept.push(arg);
            continue;
        }
        if text == "--" {
            passthrough = true;
            kept.push(arg);
            continue;
        }

        if text.starts_with('-') {
            if known.is_known(text) {
                kept.push(arg);
                after_unknown_long = false;
            } else {
                after_unknown_long = text.starts_with("--") && !text.contains('=');
                dropped.push(text.to_string());
            }
            continue;
        }

        if after_unknown_long && !known.words.iter().any(|w| w == text) {
            dropped.push(text.to_string());
        } else {
            kept.push(arg);
        }
        after_unknown_long = false;
    }

    (kept, dropped)
}
