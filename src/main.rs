use std::panic::{AssertUnwindSafe, catch_unwind};

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

mod author;
mod cli;
mod error;
mod format;
mod identifier;
mod record;
mod registry;
mod resolver;
mod scrape;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    for input in &args.inputs {
        handle(input);
    }
    Ok(())
}

/// Resolve one input and present the result. A fault in one input must not
/// take the others down, so even panics stop here.
fn handle(input: &str) {
    match catch_unwind(AssertUnwindSafe(|| resolver::resolve(input))) {
        Ok(Ok(citation)) => {
            println!(
                "<b>Reference</b>\n{}\n\n<b>In-text</b>\n{}",
                citation.reference, citation.in_text
            );
        }
        Ok(Err(e)) => {
            error!(input, error = %e, "resolution failed");
            eprintln!("{}", e.user_message());
        }
        Err(_) => {
            error!(input, "unexpected fault during resolution");
            eprintln!(
                "Sorry, something went wrong building that citation. \
                 Try the DOI or URL again, or construct the reference manually."
            );
        }
    }
}
