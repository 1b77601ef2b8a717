// Entrypoint for the drivescope binary.
// - Keeps `main` small: parse flags, build the HTTP client and the
//   terminal prompter, hand all three to `ui::run`.
// - The returned code becomes the process exit status; anything the
//   flow did not handle propagates as an `anyhow` error.

use clap::Parser;
use drivescope_cli::{api::HttpDriveClient, cli::Cli, ui};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Gateway URL comes from `DRIVE_GATEWAY_URL` or defaults to a local
    // instance. See `api::HttpDriveClient::from_env`.
    let mut api = HttpDriveClient::from_env()?;
    let mut prompt = ui::TermPrompt;

    let code = ui::run(&cli, &mut api, &mut prompt)?;
    std::process::exit(code);
}
