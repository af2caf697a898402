//! Encode an animal-tag profile dataset (tidy CSV) as a BUFR message.
use std::path::PathBuf;
use std::process::ExitCode;

use bufr_tag_out::animal_tag::{animal_tag_section1, encode_animal_tag};
use bufr_tag_out::observations::{ObservationSet, TagMetadata};
use chrono::Utc;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(about = "Encode an animal-tag profile dataset as BUFR edition 4")]
struct Args {
    /// Profile dataset CSV (time,profile,lat,lon,z,temperature[,salinity][,pressure]).
    profile_dataset: PathBuf,

    /// Output file.
    #[arg(short, long, default_value = "output.bufr")]
    output: PathBuf,

    /// Platform unique identifier (long station name field).
    #[arg(short, long)]
    uuid: Option<String>,

    /// Platform transmitter id.
    #[arg(short, long)]
    ptt: Option<String>,
}

fn run(args: Args) -> Result<(), bufr_tag_out::BufrError> {
    let observations = ObservationSet::from_csv_path(&args.profile_dataset)?;

    let mut metadata = TagMetadata::default();
    if let Some(uuid) = args.uuid {
        metadata.uuid = uuid;
    }
    if let Some(ptt) = args.ptt {
        metadata.ptt = ptt;
    }

    let section1 = animal_tag_section1(Utc::now().naive_utc(), 33);
    let message = encode_animal_tag(&observations, &metadata, &section1)?;
    std::fs::write(&args.output, &message)?;
    println!(
        "Wrote {} bytes to {}",
        message.len(),
        args.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}
