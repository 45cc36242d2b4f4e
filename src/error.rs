use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
  /// The constraint solver could not decide a query (timeout, resource
  /// exhaustion, internal failure). Never to be read as UNSAT.
  #[error("solver failure: {reason}")]
  Solver {
    reason: String
  },
  /// No seed can make the generator emit `byte` at `offset`.
  #[error("byte {byte:#04x} ({}) at offset {offset} cannot be produced by any seed", printable(.byte))]
  Unmatchable {
    offset: usize,
    byte: u8
  },
  #[error("invalid configuration: {reason}")]
  Config {
    reason: String
  },
  #[error(transparent)]
  IO {
    #[from]
    error: std::io::Error
  },
  #[error(transparent)]
  Json {
    #[from]
    error: serde_json::Error
  },
  #[error("{error}")]
  SimpleString {
    error: String
  }
}

fn printable(byte: &u8) -> String {
  (*byte as char).escape_default().to_string()
}

impl Error {
  pub fn solver(reason: impl Into<String>) -> Self {
    Error::Solver { reason: reason.into() }
  }

  pub fn config(reason: impl Into<String>) -> Self {
    Error::Config { reason: reason.into() }
  }
}

impl From<String> for Error {
  fn from(error: String) -> Self {
    Error::SimpleString { error }
  }
}
