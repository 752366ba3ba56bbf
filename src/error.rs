use derive_more::{Display, From};

use crate::block_hash::BlockHash;

/// Exit code `clap` uses when the command line itself is rejected.
pub const USAGE_EXIT_CODE: u8 = 2;

/// Everything that can abort a run. None of these are recovered from locally.
#[derive(Debug, Display, From)]
pub enum Error {
    /// A configured upgrade block has no resolvable historical hash.
    #[display(fmt = "could not resolve upgrade block {}: {}", block, reason)]
    Resolution { block: u64, reason: String },
    /// State at a resolved block could not be read.
    #[display(fmt = "could not query runtime at block {} ({}): {}", block, hash, reason)]
    Query {
        block: u64,
        hash: BlockHash,
        reason: String,
    },
    /// A runtime reported a version that is not an integer.
    #[display(
        fmt = "runtime at block {} reports malformed version {:?}",
        block,
        version
    )]
    MalformedVersion { block: u64, version: String },
    /// Two upgrade points reported the same runtime version.
    #[display(
        fmt = "runtime version {} reported at both block {} and block {}",
        version,
        first,
        second
    )]
    DuplicateVersion { version: u64, first: u64, second: u64 },
    #[from]
    #[display(fmt = "I/O error: {}", _0)]
    IO(std::io::Error),
    #[from]
    #[display(fmt = "malformed JSON: {}", _0)]
    Serde(serde_json::Error),
}

impl std::error::Error for Error {}

impl Error {
    /// The process exit code for this failure, distinct per kind and never
    /// [`USAGE_EXIT_CODE`].
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::IO(_) | Error::Serde(_) => 1,
            Error::Resolution { .. } => 3,
            Error::Query { .. } => 4,
            Error::MalformedVersion { .. } => 5,
            Error::DuplicateVersion { .. } => 6,
        }
    }

    /// Which part of the run produced this failure, for log context.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::IO(_) | Error::Serde(_) => "loading input",
            Error::Resolution { .. } => "resolving upgrade blocks",
            Error::Query { .. } => "querying runtimes",
            Error::MalformedVersion { .. } | Error::DuplicateVersion { .. } => "ordering runtimes",
        }
    }
}

#[test]
fn test_exit_codes_are_distinct() {
    let errors = vec![
        Error::Resolution {
            block: 1,
            reason: String::from("pruned"),
        },
        Error::Query {
            block: 1,
            hash: BlockHash::from([0u8; 32]),
            reason: String::from("gone"),
        },
        Error::MalformedVersion {
            block: 1,
            version: String::from("v2"),
        },
        Error::DuplicateVersion {
            version: 9,
            first: 1,
            second: 2,
        },
    ];
    let codes: std::collections::BTreeSet<u8> = errors.iter().map(Error::exit_code).collect();
    assert_eq!(codes.len(), errors.len());
    assert!(!codes.contains(&0));
    assert!(!codes.contains(&USAGE_EXIT_CODE));

    let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
    assert!(!codes.contains(&io.exit_code()));
    assert_ne!(io.exit_code(), USAGE_EXIT_CODE);
}

#[test]
fn test_usage_code_matches_clap() {
    let err = clap::Command::new("palletdiff")
        .try_get_matches_from(["palletdiff", "--no-such-flag"])
        .unwrap_err();
    assert_eq!(err.exit_code(), i32::from(USAGE_EXIT_CODE));
}

#[test]
fn test_error_display() {
    let err = Error::MalformedVersion {
        block: 42,
        version: String::from("v2"),
    };
    assert_eq!(
        err.to_string(),
        "runtime at block 42 reports malformed version \"v2\""
    );
}
