use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use smf_parser::{
    EventPayload, MidiError, MidiFile, ParserConfig, PitchBendOrder, Track, ValidationConfig,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Default,
    Strict,
    Permissive,
}

impl Preset {
    fn parser_config(self) -> ParserConfig {
        match self {
            Preset::Default => ParserConfig::default(),
            Preset::Strict => ParserConfig::security_focused(),
            Preset::Permissive => ParserConfig::permissive(),
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Decode a Standard MIDI File and dump its contents", long_about = None)]
struct Args {
    /// MIDI file to decode
    path: String,

    /// Print the decoded file as JSON
    #[clap(short = 'j', long, value_parser)]
    json: bool,

    /// Print every event instead of a per-track summary
    #[clap(short = 'e', long, value_parser)]
    events: bool,

    /// Decoder limits
    #[clap(short = 'p', long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Assemble pitch bend values with the first data byte as LSB
    #[clap(long, value_parser)]
    lsb_pitch_bend: bool,

    /// Run structural validation after decoding; with --preset strict,
    /// findings are errors
    #[clap(long, value_parser)]
    validate: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error [{}] ({}): {}", error.code(), error.category(), error);
            eprintln!("hint: {}", error.suggested_action());
            ExitCode::FAILURE
        },
    }
}

fn run(args: &Args) -> Result<(), MidiError> {
    let mut parser_config = args.preset.parser_config();
    if args.lsb_pitch_bend {
        parser_config = parser_config.with_pitch_bend_order(PitchBendOrder::LsbFirst);
    }

    let midi_file = MidiFile::from_path_with_config(&args.path, parser_config)?;

    if args.validate {
        let validation_config = ValidationConfig {
            strict_mode: matches!(args.preset, Preset::Strict),
            ..ValidationConfig::default()
        };
        let report = midi_file.validate_with_config(validation_config)?;
        for finding in &report.findings {
            eprintln!("warning: {}", finding);
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&midi_file).map_err(|e| MidiError::FileReadError {
            path: args.path.clone(),
            reason: format!("JSON serialization failed: {}", e),
        })?;
        println!("{}", json);
        return Ok(());
    }

    print_summary(&midi_file, args.events);
    Ok(())
}

fn print_summary(midi_file: &MidiFile, with_events: bool) {
    let header = &midi_file.header;
    println!(
        "Format {} ({})",
        header.format as u16,
        header.format.description()
    );
    println!(
        "Tracks: {} declared, {} decoded",
        midi_file.declared_track_count(),
        midi_file.track_count()
    );
    println!(
        "Division: 0x{:04X} {:?} ({})",
        header.raw_division,
        header.division,
        header.division.description()
    );
    for (tick, tempo) in midi_file.tempo_changes() {
        println!("Tempo at tick {}: {} us per quarter note", tick, tempo);
    }

    for track in &midi_file.tracks {
        print_track(track, with_events);
    }
}

fn print_track(track: &Track, with_events: bool) {
    let name = track.name().unwrap_or_default();
    println!(
        "Track {} {:?}: {} bytes, {} events, ends at tick {}",
        track.number,
        name,
        track.length,
        track.events.len(),
        track.end_time()
    );

    if with_events {
        for event in &track.events {
            println!("  {}", event);
        }
        return;
    }

    let notes = track
        .events
        .iter()
        .filter(|event| matches!(event.payload, EventPayload::Note { .. }))
        .count();
    let skipped = track
        .events
        .iter()
        .filter(|event| matches!(event.payload, EventPayload::UnknownMeta { .. }))
        .count();
    println!("  note events: {}, unknown meta events: {}", notes, skipped);
}
