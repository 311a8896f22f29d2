use std::fmt;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: pianola <octave> <scale> <section-seconds> <verses> [options]
       pianola --list-scales [--config PATH]
       pianola --list-ports

options:
  --seed N         seed the generator (default: system clock)
  --port N|NAME    MIDI output port index or name fragment (default: 0)
  --config PATH    merge PATH over the built-in config
  --dry-run        print note events instead of playing them
  -v, --verbose    debug logging on stderr
  -h, --help       show this help";

/// Which output port to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortChoice {
    Index(usize),
    Name(String),
}

impl Default for PortChoice {
    fn default() -> Self {
        PortChoice::Index(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayArgs {
    pub octave: i32,
    pub scale: String,
    pub section_seconds: f64,
    pub verses: i32,
    pub seed: Option<u64>,
    pub port: PortChoice,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play(PlayArgs),
    ListScales,
    ListPorts,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    MissingValue(&'static str),
    UnknownFlag(String),
    WrongPositionalCount(usize),
    BadNumber { name: &'static str, value: String },
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue(flag) => write!(f, "{} needs a value", flag),
            Self::UnknownFlag(flag) => write!(f, "unknown option '{}'", flag),
            Self::WrongPositionalCount(n) => {
                write!(f, "expected 4 arguments (octave, scale, section seconds, verses), got {}", n)
            }
            Self::BadNumber { name, value } => write!(f, "{} '{}' is not a number", name, value),
        }
    }
}

impl std::error::Error for ArgError {}

/// Parse arguments (program name already stripped).
///
/// Anything that is not a known flag is positional, so negative octaves and
/// verse counts like `-1` pass through to validation.
pub fn parse(args: &[String]) -> Result<Invocation, ArgError> {
    let mut positional: Vec<&str> = Vec::new();
    let mut seed = None;
    let mut port = PortChoice::default();
    let mut config = None;
    let mut dry_run = false;
    let mut verbose = false;
    let mut list_scales = false;
    let mut list_ports = false;
    let mut help = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => help = true,
            "--dry-run" => dry_run = true,
            "--list-scales" => list_scales = true,
            "--list-ports" => list_ports = true,
            "--seed" => {
                let value = iter.next().ok_or(ArgError::MissingValue("--seed"))?;
                seed = Some(number("seed", value)?);
            }
            "--port" => {
                let value = iter.next().ok_or(ArgError::MissingValue("--port"))?;
                port = match value.parse::<usize>() {
                    Ok(index) => PortChoice::Index(index),
                    Err(_) => PortChoice::Name(value.clone()),
                };
            }
            "--config" => {
                let value = iter.next().ok_or(ArgError::MissingValue("--config"))?;
                config = Some(PathBuf::from(value));
            }
            flag if flag.starts_with("--") => return Err(ArgError::UnknownFlag(flag.to_string())),
            other => positional.push(other),
        }
    }

    let command = if help {
        Command::Help
    } else if list_scales {
        Command::ListScales
    } else if list_ports {
        Command::ListPorts
    } else {
        let [octave, scale, seconds, verses] = positional[..] else {
            return Err(ArgError::WrongPositionalCount(positional.len()));
        };
        Command::Play(PlayArgs {
            octave: number("octave", octave)?,
            scale: scale.to_string(),
            section_seconds: number("section seconds", seconds)?,
            verses: number("verses", verses)?,
            seed,
            port,
            dry_run,
        })
    };

    Ok(Invocation {
        command,
        config,
        verbose,
    })
}

fn number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ArgError> {
    value.parse().map_err(|_| ArgError::BadNumber {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn positional_play() {
        let inv = parse(&args("4 CM 10 2")).unwrap();
        assert_eq!(
            inv.command,
            Command::Play(PlayArgs {
                octave: 4,
                scale: "CM".into(),
                section_seconds: 10.0,
                verses: 2,
                seed: None,
                port: PortChoice::Index(0),
                dry_run: false,
            })
        );
        assert!(!inv.verbose);
        assert_eq!(inv.config, None);
    }

    #[test]
    fn flags_anywhere() {
        let inv = parse(&args("--seed 7 3 F#m -v 12.5 0 --port IAC --dry-run --config /tmp/p.toml")).unwrap();
        let Command::Play(play) = inv.command else {
            panic!("expected play");
        };
        assert_eq!(play.octave, 3);
        assert_eq!(play.scale, "F#m");
        assert_eq!(play.section_seconds, 12.5);
        assert_eq!(play.seed, Some(7));
        assert_eq!(play.port, PortChoice::Name("IAC".into()));
        assert!(play.dry_run);
        assert!(inv.verbose);
        assert_eq!(inv.config, Some(PathBuf::from("/tmp/p.toml")));
    }

    #[test]
    fn negative_numbers_are_positional() {
        let inv = parse(&args("-1 Am 5 -2")).unwrap();
        let Command::Play(play) = inv.command else {
            panic!("expected play");
        };
        assert_eq!(play.octave, -1);
        assert_eq!(play.verses, -2);
    }

    #[test]
    fn listing_needs_no_positionals() {
        assert_eq!(parse(&args("--list-scales")).unwrap().command, Command::ListScales);
        assert_eq!(parse(&args("--list-ports -v")).unwrap().command, Command::ListPorts);
        assert_eq!(parse(&args("-h")).unwrap().command, Command::Help);
    }

    #[test]
    fn errors() {
        assert_eq!(parse(&args("4 CM 10")), Err(ArgError::WrongPositionalCount(3)));
        assert_eq!(parse(&args("4 CM 10 1 --seed")), Err(ArgError::MissingValue("--seed")));
        assert_eq!(
            parse(&args("4 CM 10 1 --loud")),
            Err(ArgError::UnknownFlag("--loud".into()))
        );
        assert_eq!(
            parse(&args("four CM 10 1")),
            Err(ArgError::BadNumber {
                name: "octave",
                value: "four".into()
            })
        );
    }
}
