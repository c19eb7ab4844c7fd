use crate::prelude::*;

#[allow(unused_imports)]
mod prelude {
    pub use std::path::{Path, PathBuf};

    pub use anyhow::{Context, Result as AnyResult, bail};
}

mod cmd {
    pub mod decode;
    pub mod encode;
    pub mod info;
    pub mod normals;
    pub mod verify;
}

mod util;

#[derive(clap::Parser, Debug)]
#[command(about = "Tool for decoding and re-encoding packed vertex streams.")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    /// Operation to perform
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Print extra info about what the tool is doing
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Debug)]
struct StreamArgs {
    /// Vertex format name, e.g. R16G16B16A16_SNORM
    #[arg(short, long)]
    format: String,
    /// Bytes between consecutive items (0: tightly packed)
    #[arg(short, long, default_value_t = 0)]
    stride: usize,
    /// Byte offset of the attribute within each item
    #[arg(short, long, default_value_t = 0)]
    offset: usize,
    /// Number of items (default: as many as fit in the buffer)
    #[arg(short = 'n', long)]
    count: Option<usize>,
}

#[derive(clap::Args, Debug)]
struct FloatArgs {
    /// Read/write floats as raw little-endian f32 instead of text
    #[arg(long)]
    raw: bool,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Overwrite output file if it exists
    #[arg(short = 'O', long)]
    overwrite: bool,
}

#[derive(clap::Args, Debug)]
struct InputPath {
    /// Path to the input file
    in_file: PathBuf,
}

#[derive(clap::Args, Debug)]
struct OptOutputPath {
    /// Path where to save the output file (stdout if unspecified)
    out_file: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum CliCommand {
    /// Print information about the tool
    Version,
    /// Show how vertex format names are interpreted
    Info(cmd::info::InfoArgs),
    /// Decode a vertex buffer into floats
    Decode(cmd::decode::DecodeArgs),
    /// Encode floats into a vertex buffer
    Encode(cmd::encode::EncodeArgs),
    /// Check that a vertex buffer survives decoding and re-encoding
    Verify(cmd::verify::VerifyArgs),
    /// Decode a tangent frame stream into unit normals
    Normals(cmd::normals::NormalsArgs),
}

fn run_command(cli: &Cli) -> AnyResult<()> {
    match &cli.command {
        CliCommand::Version => {
            // Verbose always prints version anyway
            if !cli.common.verbose {
                print_version();
            }
            Ok(())
        }
        CliCommand::Info(args) => cmd::info::run(&cli.common, args),
        CliCommand::Decode(args) => cmd::decode::run(&cli.common, args),
        CliCommand::Encode(args) => cmd::encode::run(&cli.common, args),
        CliCommand::Verify(args) => cmd::verify::run(&cli.common, args),
        CliCommand::Normals(args) => cmd::normals::run(&cli.common, args),
    }
}

fn print_version() {
    eprintln!(
        "{} version {}.",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );
    eprintln!();
}

fn main() {
    use clap::Parser;
    let cli = Cli::parse();

    let default_filter = if cli.common.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .init();

    if cli.common.verbose {
        print_version();
    }

    if let Err(e) = run_command(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(2);
    }
}
