//! CLI tool for browsing ZIP archives as a filesystem.

mod commands;
mod exit_codes;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Browse single and split ZIP archives as a read-only filesystem
#[derive(Parser)]
#[command(name = "zipvfs")]
#[command(author, version, about = "Browse single and split ZIP archives", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Encoding of entry names stored without the UTF-8 flag (e.g. sjis, windows-1252)
    #[arg(long, short = 'e', global = true, env = "ZIPVFS_ENCODING")]
    encoding: Option<String>,

    /// Skip CRC-32 verification of entry data
    #[arg(long, global = true)]
    no_verify: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the children of a directory
    Ls {
        /// Any segment of the archive
        archive: PathBuf,

        /// Directory inside the archive
        #[arg(default_value = "/")]
        path: String,

        /// Show size and modification time
        #[arg(short = 'l', long)]
        long: bool,
    },

    /// List a directory recursively
    Tree {
        /// Any segment of the archive
        archive: PathBuf,

        /// Directory inside the archive
        #[arg(default_value = "/")]
        path: String,
    },

    /// Show the attributes of a path
    Stat {
        /// Any segment of the archive
        archive: PathBuf,

        /// Path inside the archive
        path: String,
    },

    /// Write the contents of a file to stdout
    Cat {
        /// Any segment of the archive
        archive: PathBuf,

        /// File inside the archive
        path: String,
    },

    /// Show the segments that make up an archive
    Segments {
        /// Any segment of the archive
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let options = match commands::open_options(cli.encoding.as_deref(), !cli.no_verify) {
        Ok(options) => options,
        Err(code) => std::process::exit(code.code()),
    };

    let exit_code = match cli.command {
        Commands::Ls {
            archive,
            path,
            long,
        } => commands::ls(&archive, &path, long, &options, cli.format),

        Commands::Tree { archive, path } => commands::tree(&archive, &path, &options, cli.format),

        Commands::Stat { archive, path } => commands::stat(&archive, &path, &options, cli.format),

        Commands::Cat { archive, path } => commands::cat(&archive, &path, &options),

        Commands::Segments { archive } => commands::segments(&archive, &options, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
