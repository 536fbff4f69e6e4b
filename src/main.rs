// Interactive front end for bcrypt_eks.
//
// Passwords are always read from the terminal without echo, never from
// arguments, so they do not end up in shell history.

use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

use bcrypt_eks::{verify, Hasher, Version, DEFAULT_COST};
use clap::{Parser, Subcommand};
use rpassword::read_password;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

/// Hash and verify passwords with bcrypt
#[derive(Parser, Debug)]
#[command(name = "bcrypt-eks", version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr (otherwise RUST_LOG applies)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// NFKC-normalize the password first, so equivalent Unicode spellings match
    #[arg(long, global = true)]
    nfkc: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash a password read from the terminal
    Hash {
        /// Work factor, log2 of the key schedule rounds (4-31)
        #[arg(short, long, default_value_t = DEFAULT_COST)]
        cost: u32,

        /// Format version to emit
        #[arg(long, value_name = "2a|2b|2y", default_value_t = Version::V2b)]
        variant: Version,

        /// Use this 22-character encoded salt instead of a random one
        #[arg(long)]
        salt: Option<String>,
    },

    /// Verify a password read from the terminal against a stored hash
    Verify {
        /// The 60-character encoded hash
        hash: String,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// Read password securely (without displaying it)
fn prompt_password(prompt: &str, nfkc: bool) -> io::Result<Zeroizing<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let password = Zeroizing::new(read_password()?);

    if nfkc {
        Ok(Zeroizing::new(password.nfkc().collect::<String>()))
    } else {
        Ok(password)
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    match cli.command {
        Command::Hash { cost, variant, salt } => {
            let password = prompt_password("Enter password to hash: ", cli.nfkc)?;
            let hasher = Hasher::new(variant);
            let hashed = match salt {
                Some(salt) => hasher.hash_with_salt(password.as_bytes(), cost, &salt)?,
                None => hasher.hash(password.as_bytes(), cost)?,
            };
            println!("{hashed}");
            Ok(true)
        }
        Command::Verify { hash } => {
            let password = prompt_password("Enter password to verify: ", cli.nfkc)?;
            let is_valid = verify(password.as_bytes(), hash.trim())?;
            println!("{}", if is_valid { "success" } else { "failed" });
            Ok(is_valid)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn hash_defaults() {
        let cli = Cli::parse_from(["bcrypt-eks", "hash"]);
        match cli.command {
            Command::Hash { cost, variant, salt } => {
                assert_eq!(cost, DEFAULT_COST);
                assert_eq!(variant, Version::V2b);
                assert!(salt.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn hash_flags() {
        let cli = Cli::parse_from(["bcrypt-eks", "--nfkc", "hash", "-c", "12", "--variant", "2a"]);
        assert!(cli.nfkc);
        match cli.command {
            Command::Hash { cost, variant, .. } => {
                assert_eq!(cost, 12);
                assert_eq!(variant, Version::V2a);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(Cli::try_parse_from(["bcrypt-eks", "hash", "--variant", "2x"]).is_err());
    }

    #[test]
    fn nfkc_unifies_combining_sequences() {
        let composed: String = "café".nfkc().collect();
        let decomposed: String = "cafe\u{0301}".nfkc().collect();
        assert_eq!(composed, decomposed);
    }
}
