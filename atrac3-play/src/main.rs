// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::path::Path;

use atrac3_core::errors::{unsupported_error, Result};
use atrac3_lp2::{Atrac3Decoder, STEREO_BLOCK_BYTES};
use atrac3_wav::{read_wav, WavWriter};

use clap::{App, Arg};
use log::{info, warn};

const SAMPLE_RATE: u32 = 44100;

fn main() {
    let matches = App::new("Atrac3 Play")
        .version("0.1")
        .about("Decode ATRAC3 LP2 WAV files to PCM WAV with Project Atrac3")
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("-o")
                .value_name("PATH")
                .help("The output PCM WAV file to write")
                .default_value("output.wav"),
        )
        .arg(Arg::with_name("quiet").long("quiet").short("-q").help("Disable all log output"))
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("-v")
                .help("Enable verbose log output"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("The input file path (a WAV file with an ATRAC3 LP2 payload)")
                .required(true)
                .index(1),
        )
        .get_matches();

    // RUST_LOG takes precedence over the verbosity switches.
    let mut builder = pretty_env_logger::formatted_builder();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    else if matches.is_present("quiet") {
        builder.filter_level(log::LevelFilter::Off);
    }
    else if matches.is_present("verbose") {
        builder.filter_level(log::LevelFilter::Debug);
    }
    else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();

    let input = Path::new(matches.value_of("INPUT").unwrap());
    let output = Path::new(matches.value_of("output").unwrap());

    std::process::exit(match run(input, output) {
        Ok(()) => 0,
        Err(err) => {
            log::error!("{}", err);
            1
        }
    });
}

fn run(input: &Path, output: &Path) -> Result<()> {
    info!("decoding ATRAC3 LP2 file: {}", input.display());

    let file = std::fs::read(input)?;
    let (wav_info, payload) = read_wav(&file)?;

    if !wav_info.is_atrac3_lp2() {
        return unsupported_error("input is not an ATRAC3 LP2 WAV file");
    }

    let mut writer = WavWriter::create(output, 2, SAMPLE_RATE)?;
    info!("writing PCM to: {}", output.display());

    let mut decoder = Atrac3Decoder::new();
    let mut left = Vec::new();
    let mut right = Vec::new();

    let num_blocks = payload.len() / STEREO_BLOCK_BYTES;
    let mut samples_per_channel: u64 = 0;

    for (index, block) in payload.chunks_exact(STEREO_BLOCK_BYTES).enumerate() {
        left.clear();
        right.clear();

        // A frame that fails to parse is dropped; decoding continues with the next block.
        if let Err(err) = decoder.decode_block(block, &mut left, &mut right) {
            warn!("dropped frame {}: {}", index, err);
            continue;
        }

        samples_per_channel += writer.append_stereo(&left, &right)? as u64;

        if index % 200 == 0 {
            log::debug!("decoded frame {} / {}", index, num_blocks);
        }
    }

    let trailing = payload.len() % STEREO_BLOCK_BYTES;
    if trailing != 0 {
        warn!("ignoring {} trailing bytes (not a whole stereo block)", trailing);
    }

    writer.finalize()?;

    let seconds = samples_per_channel / u64::from(SAMPLE_RATE);
    info!("done, {} frames, duration {}:{:02}", num_blocks, seconds / 60, seconds % 60);

    Ok(())
}
