// Command-line surface for the drivescope binary. Every flag here only
// skips an interactive prompt; anything not supplied on the command
// line is collected on stdin before the first network call.

use clap::Parser;

/// Log in to a cloud drive account and print the root directory of the
/// remote drive.
#[derive(Parser, Debug)]
#[command(
    name = "drivescope",
    version,
    about = "Log in to a cloud drive account and list the root of the remote drive."
)]
pub struct Cli {
    /// Use this email instead of prompting.
    #[arg(long, short = 'E')]
    pub email: Option<String>,

    /// (NOT RECOMMENDED) Use this password instead of prompting.
    #[arg(long, short = 'P', conflicts_with = "keychain")]
    pub password: Option<String>,

    /// Use the system keychain for password authentication.
    #[arg(long, short = 'K')]
    pub keychain: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_flag_is_parsed() {
        let cli = Cli::try_parse_from(["drivescope", "--email", "foo@example.com"]).unwrap();
        assert_eq!(cli.email.as_deref(), Some("foo@example.com"));
        assert!(cli.password.is_none());
        assert!(!cli.keychain);
    }

    #[test]
    fn password_and_keychain_are_mutually_exclusive() {
        let parsed = Cli::try_parse_from(["drivescope", "--password", "hunter2", "--keychain"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn short_flags_match_long_flags() {
        let cli = Cli::try_parse_from(["drivescope", "-E", "foo@example.com", "-K"]).unwrap();
        assert_eq!(cli.email.as_deref(), Some("foo@example.com"));
        assert!(cli.keychain);
    }
}
