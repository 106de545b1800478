use clap::CommandFactory;
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io::{Error, Result};
use std::path::{Path, PathBuf};

#[path = "src/cli.rs"]
mod cli;

const BIN_NAME: &str = "dap-protocol-gen";
const SHELLS: [Shell; 3] = [Shell::Bash, Shell::Fish, Shell::Zsh];

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| Error::other("OUT_DIR not set"))?;
    let mut cmd = cli::ProtocolGenArgs::command().name(BIN_NAME);

    write_man_page(&cmd, &out_dir.join("man"))?;

    let comp_dir = out_dir.join("completions");
    fs::create_dir_all(&comp_dir)?;
    for shell in SHELLS {
        generate_to(shell, &mut cmd, BIN_NAME, &comp_dir)?;
    }

    Ok(())
}

/// Section 1 page, stamped with the crate version
fn write_man_page(cmd: &clap::Command, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let mut page = Vec::new();
    Man::new(cmd.clone())
        .section("1")
        .source(format!("{BIN_NAME} {}", env!("CARGO_PKG_VERSION")))
        .render(&mut page)?;
    fs::write(dir.join(format!("{BIN_NAME}.1")), page)
}
