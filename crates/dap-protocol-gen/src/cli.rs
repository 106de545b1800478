use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate C++ debug adapter protocol bindings from the protocol JSON schema"
)]
pub struct ProtocolGenArgs {
    /// Path to KDL config file
    #[arg(short = 'c', long, default_value = "protocol_gen.kdl")]
    pub config: PathBuf,

    /// Read the schema from this file instead of the configured source
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Cache file for the downloaded schema
    #[arg(long, conflicts_with = "schema")]
    pub cache: Option<PathBuf>,

    /// Skip running the formatter over the generated files
    #[arg(long)]
    pub no_format: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
