use clap::{Parser, Subcommand, ValueEnum};
use seedspell::config::SearchConfig;
use seedspell::constraint::{Backend, EnumerationBackend, Z3Backend};
use seedspell::error::Error;
use seedspell::extract::{CaseMode, Extractor};
use seedspell::segment::{replay, Segment, Segmentation, Segmenter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{warn, Level};

type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Parser)]
#[command(name = "seedspell", about = "Find java.util.Random seeds whose output spells a message")]
struct Cli {
  /// -v info, -vv debug, -vvv trace
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,
  #[command(subcommand)]
  command: Command
}

#[derive(Subcommand)]
enum Command {
  /// Split MESSAGE into runs, each produced by one seed
  Find {
    message: String,
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,
    #[arg(short, long, value_enum)]
    case: Option<CaseMode>,
    /// Move letters into the chosen case before searching
    #[arg(long)]
    fold_case: bool,
    #[arg(short, long, value_enum, default_value_t = BackendKind::Enumerate)]
    backend: BackendKind,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// JSON file with max_depth / case / timeout_ms
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    #[arg(long, default_value = "RandomMessage")]
    class_name: String
  },
  /// Print what each SEED:LENGTH pair produces
  Replay {
    #[arg(short, long, value_enum, default_value_t = CaseMode::Lower)]
    case: CaseMode,
    #[arg(required = true, value_parser = parse_pair)]
    pairs: Vec<Segment>
  }
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendKind {
  Enumerate,
  Z3
}

impl BackendKind {
  /// Whether `timeout_ms` bounds this backend's queries.
  fn honours_timeout(self) -> bool {
    match self {
      BackendKind::Enumerate => false,
      BackendKind::Z3 => true
    }
  }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
  Text,
  Json,
  Java
}

fn parse_pair(pair: &str) -> core::result::Result<Segment, String> {
  let (seed, length) = pair
    .split_once(':')
    .ok_or_else(|| format!("expected SEED:LENGTH, got {:?}", pair))?;
  let seed = seed.trim().parse::<u64>()
    .map_err(|e| format!("invalid seed {:?}: {}", seed, e))?;
  let length = length.trim().parse::<usize>()
    .map_err(|e| format!("invalid length {:?}: {}", length, e))?;
  Ok(Segment { seed, length })
}

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => Level::WARN,
    1 => Level::INFO,
    2 => Level::DEBUG,
    _ => Level::TRACE
  };
  let subscriber = tracing_subscriber::FmtSubscriber::builder()
    .with_max_level(level)
    .with_writer(std::io::stderr)
    .finish();
  if tracing::subscriber::set_global_default(subscriber).is_err() {
    eprintln!("tracing subscriber already installed");
  }
}

fn segment_with<B: Backend>(backend: &B, config: SearchConfig, message: &[u8]) -> Result<Segmentation> {
  Segmenter::new(backend, config)?.segment(message)
}

fn find(
  message: String,
  config: SearchConfig,
  fold_case: bool,
  backend: BackendKind,
  format: Format,
  class_name: &str
) -> Result<()> {
  config.validate()?;
  if let Some(timeout_ms) = config.timeout_ms {
    if !backend.honours_timeout() {
      warn!(timeout_ms, "the enumerate backend has no per-query timeout; ignoring timeout_ms");
    }
  }
  let extractor = config.extractor();
  let message: Vec<u8> = if fold_case {
    message.bytes().map(|byte| extractor.fold(byte)).collect()
  } else {
    message.into_bytes()
  };
  if let Some((offset, byte)) = extractor.first_unrealizable(&message) {
    return Err(Error::Unmatchable { offset, byte });
  }

  let segmentation = match backend {
    BackendKind::Enumerate => segment_with(&EnumerationBackend, config, &message)?,
    BackendKind::Z3 => segment_with(&Z3Backend::new(config.timeout_ms)?, config, &message)?
  };
  if segmentation.render() != message {
    return Err(Error::from("replayed seeds do not reproduce the message".to_string()));
  }

  match format {
    Format::Text => {
      for segment in &segmentation.segments {
        println!("{} {}", segment.seed, segment.length);
      }
      let seeds: Vec<u64> = segmentation.segments.iter().map(|segment| segment.seed).collect();
      println!("{:?}", seeds);
    }
    Format::Json => println!("{}", serde_json::to_string_pretty(&segmentation)?),
    Format::Java => print!("{}", segmentation.to_java(class_name))
  }
  Ok(())
}

fn execute(command: Command) -> Result<()> {
  match command {
    Command::Find { message, max_depth, case, fold_case, backend, timeout_ms, config, format, class_name } => {
      let mut search = match config {
        Some(path) => SearchConfig::from_file(&path)?,
        None => SearchConfig::default()
      };
      if let Some(max_depth) = max_depth {
        search.max_depth = max_depth;
      }
      if let Some(case) = case {
        search.case = case;
      }
      if timeout_ms.is_some() {
        search.timeout_ms = timeout_ms;
      }
      find(message, search, fold_case, backend, format, &class_name)
    }
    Command::Replay { case, pairs } => {
      let extractor = Extractor::new(case);
      let output: Vec<u8> = pairs
        .iter()
        .flat_map(|pair| replay(pair.seed, pair.length, extractor))
        .collect();
      println!("{}", String::from_utf8_lossy(&output));
      Ok(())
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);
  match execute(cli.command) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {}", e);
      ExitCode::FAILURE
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_seed_length_pairs() {
    assert_eq!(parse_pair("238344791200146:1").unwrap(), Segment { seed: 238344791200146, length: 1 });
    assert!(parse_pair("12").is_err());
    assert!(parse_pair("x:1").is_err());
  }

  #[test]
  fn only_z3_honours_timeouts() {
    assert!(!BackendKind::Enumerate.honours_timeout());
    assert!(BackendKind::Z3.honours_timeout());
  }

  #[test]
  fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
  }
}
