use clap::Parser;
use dap_protocol_gen::cli::ProtocolGenArgs;
use dap_protocol_gen::codegen::CodeGenerator;
use dap_protocol_gen::fetch::{Config, LocalSource, Source, SourceType};
use dap_protocol_gen::format::Formatter;
use dap_protocol_gen::schema::Schema;
use miette::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ProtocolGenArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("DAP_PROTOCOL_GEN_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if args.verbose {
        println!("Reading config from {:?}...", args.config);
    }
    let config = Config::load(&args.config)?;
    let source = select_source(&args, config.source.clone());

    println!("Fetching schema from {}...", source.origin());
    let bytes = source.fetch().await?;
    let origin = source.origin();
    let schema = Schema::parse(&bytes, origin.as_str())?;
    if schema.is_empty() {
        tracing::warn!("{origin} has no definitions, only boilerplate will be written");
    }
    println!("Loaded {} definitions", schema.len());

    let codegen = CodeGenerator::new(&schema, config.output.layout.clone());
    codegen.write_to_disk(&config.output.paths)?;
    println!(
        "Generated bindings in {}",
        config.output.paths.declarations.display()
    );

    if !args.no_format {
        let formatter = Formatter::from_config(config.formatter.clone());
        if args.verbose {
            println!("Formatting with {}...", formatter.program());
        }
        formatter.format_all(&config.output.paths).await?;
    }

    Ok(())
}

/// Apply the command line overrides to the configured source
fn select_source(args: &ProtocolGenArgs, configured: Source) -> Source {
    if let Some(path) = &args.schema {
        return Source {
            name: "command line".to_string(),
            source_type: SourceType::Local(LocalSource { path: path.clone() }),
        };
    }

    let mut source = configured;
    if let Some(cache) = &args.cache {
        match &mut source.source_type {
            SourceType::Http(http) => http.cache = Some(cache.clone()),
            SourceType::Local(_) => {
                tracing::warn!("source {} is a local file, ignoring --cache", source.name)
            }
        }
    }
    source
}
