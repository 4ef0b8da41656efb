// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use yal_parser::export;
use yal_parser::yal::reader::YalReader;
use yal_parser::{as_participants, ParticipantOptions, RetainFields, Result};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

/// Convert YAL module descriptions to YAML
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file (reads standard input when omitted)
    #[arg(value_name = "FILE")]
    file_name: Option<PathBuf>,

    /// Emit placement participants instead of modules
    #[arg(short, long)]
    participants: bool,

    /// Keep each participant at its own bounding box position
    #[arg(long)]
    no_rng: bool,

    /// Module fields to keep in participants (default: network)
    #[arg(long, value_name = "FIELD", num_args = 1..)]
    retain: Option<Vec<String>>,

    /// Assign a random display colour to each participant
    #[arg(long)]
    colorize: bool,

    /// Seed for random placement and colours
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
    format: Format,

    /// Also write a per-module summary table to this CSV file
    #[arg(long, value_name = "PATH")]
    csv: Option<String>,
}

fn run(args: Args) -> Result<String> {
    let reader = YalReader::new();
    let modules = match &args.file_name {
        Some(path) => reader.read(path)?,
        None => reader.read_from(io::stdin().lock())?,
    };

    if let Some(path) = &args.csv {
        export::export_modules_to_csv(&modules, path)?;
    }

    if !args.participants {
        return match args.format {
            Format::Yaml => export::modules_to_yaml(&modules),
            Format::Json => export::to_json(&modules),
        };
    }

    let retain = match &args.retain {
        Some(names) => RetainFields::from_names(names)?,
        None => RetainFields::default(),
    };
    let options = ParticipantOptions {
        randomize_placement: !args.no_rng,
        colorize: args.colorize,
        retain,
        ..Default::default()
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let participants = as_participants(&modules, &options, &mut rng)?;

    match args.format {
        Format::Yaml => export::to_yaml(&participants),
        Format::Json => export::to_json(&participants),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("yal2yaml: {e}");
            ExitCode::FAILURE
        }
    }
}
