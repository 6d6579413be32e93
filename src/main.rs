mod ss;

pub use crate::ss::*;
pub use crate::ss::config::SILENT;

use std::error::Error;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn Error>> {
    let mut ss = SS::parse();
    if ss.output == "stdout" && (ss.mode == "encrypt" || ss.mode == "decrypt") {
        ss.silent = true;
    }
    if !SILENT.is_set()? { SILENT.set(ss.silent)?; }
    let level = if ss.silent {
        Level::WARN
    } else if ss.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    debug!("Run args: {:?}", ss);
    ss.run()?;
    Ok(())
}
