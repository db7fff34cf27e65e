use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// URLs or DOIs to turn into references (each resolved independently)
    #[arg(value_name = "URL_OR_DOI", required = true)]
    pub inputs: Vec<String>,
}
