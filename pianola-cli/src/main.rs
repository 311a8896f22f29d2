mod args;

use std::fs::File;
use std::path::PathBuf;

use pianola_core::config::Config;
use pianola_core::context::GenerationContext;
use pianola_core::midi::{self, MidiOutputSink};
use pianola_core::playback::{self, CancelToken, DeviceSink, LogSink, PlaybackOutcome, SleepClock};
use pianola_core::random::{time_seed, Lcg};
use pianola_core::song::compose_song;

use args::{Command, Invocation, PlayArgs, PortChoice};

fn init_logging(verbose: bool) {
    use simplelog::*;

    let term_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pianola")
        .join("pianola.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path)
        .or_else(|_| File::create(std::env::temp_dir().join("pianola.log")));

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Ok(file) = log_file {
        loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
    }
    if CombinedLogger::init(loggers).is_err() {
        eprintln!("pianola: logger already initialized");
    }

    log::info!("pianola starting (terminal log level: {:?})", term_level);
}

fn main() {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let verbose = raw.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let invocation = match args::parse(&raw) {
        Ok(invocation) => invocation,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", args::USAGE);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(invocation) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(invocation: Invocation) -> pianola_core::Result<()> {
    match invocation.command {
        Command::Help => {
            println!("{}", args::USAGE);
            Ok(())
        }
        Command::ListScales => {
            let config = load_config(invocation.config)?;
            for id in config.scale_ids() {
                println!("{:<6} {}", id, config.scale_name(id).unwrap_or(""));
            }
            Ok(())
        }
        Command::ListPorts => {
            let ports = midi::list_ports()?;
            if ports.is_empty() {
                println!("no MIDI output ports");
            }
            for port in ports {
                println!("{}: {}", port.index, port.name);
            }
            Ok(())
        }
        Command::Play(play_args) => {
            let config = load_config(invocation.config)?;
            play(&config, play_args)
        }
    }
}

fn load_config(path: Option<PathBuf>) -> pianola_core::Result<Config> {
    match path {
        Some(path) => Config::load_from(&path),
        None => Ok(Config::load()),
    }
}

fn play(config: &Config, args: PlayArgs) -> pianola_core::Result<()> {
    let ctx = GenerationContext::new(
        config.resolve_scale(&args.scale)?,
        args.octave,
        config.generation(),
    )?;

    let seed = args.seed.unwrap_or_else(time_seed);
    log::info!("seed {}", seed);
    let song = compose_song(
        &ctx,
        ctx.start_pitch(),
        args.section_seconds,
        args.verses,
        &mut Lcg::new(seed),
    )?;
    log::info!(
        "{} in {} from {}: {} notes, {:.1}s",
        ctx.scale().name,
        ctx.scale().id,
        ctx.start_pitch(),
        song.note_count(),
        song.total_duration()
    );

    let settings = config.playback();
    let mut sink: Box<dyn DeviceSink> = if args.dry_run {
        Box::new(LogSink::stdout())
    } else {
        match &args.port {
            PortChoice::Index(index) => Box::new(MidiOutputSink::connect(*index, &settings)?),
            PortChoice::Name(name) => Box::new(MidiOutputSink::connect_by_name(name, &settings)?),
        }
    };

    let cancel = CancelToken::new();
    match playback::play(&song, settings.velocity, sink.as_mut(), &mut SleepClock, &cancel)? {
        PlaybackOutcome::Finished { notes } => log::info!("played {} notes", notes),
        PlaybackOutcome::Cancelled { notes_played } => {
            log::warn!("stopped after {} notes", notes_played)
        }
    }
    Ok(())
}
