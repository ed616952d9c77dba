mod compile;
mod parse;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chart_dump", about = "Build and inspect translation rule charts")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse sentences and print the rules of every span.
    Parse {
        /// Rule table, text or compiled (.bin); named after the file stem.
        #[arg(long = "rules", required = true)]
        rules: Vec<PathBuf>,

        /// TOML chart configuration. Defaults to one unbounded graph per table.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Do not wrap sentences in <s> ... </s>.
        #[arg(long)]
        no_boundaries: bool,

        /// Emit one JSON object per span instead of text.
        #[arg(long)]
        json: bool,

        /// Sentences to parse. Reads stdin lines when none are given.
        sentences: Vec<String>,
    },

    /// Compile a text rule table into the binary format.
    Compile {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// Left-hand side for rules that carry none.
        #[arg(long, default_value = "X")]
        default_lhs: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Parse {
            rules,
            config,
            no_boundaries,
            json,
            sentences,
        } => {
            let opts = parse::Options {
                boundaries: !no_boundaries,
                json,
            };
            parse::run(&rules, config.as_deref(), &sentences, &opts)
        }
        Command::Compile {
            input,
            output,
            default_lhs,
        } => {
            let rules = compile::run(&input, &output, &default_lhs)?;
            println!("Wrote {} rules to {}", rules, output.display());
            Ok(())
        }
    }
}
