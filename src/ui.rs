// UI layer: the interactive login conversation, built on `dialoguer`.
// Every flow takes the `DriveClient` and `Prompt` traits so tests can
// drive the whole conversation with scripted doubles.

use crate::api::{AuthMethod, ChallengeKind, DriveClient, TrustedDevice};
use crate::cli::Cli;
use anyhow::Result;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

/// Terminal prompting, narrowed to the three interactions the login
/// flow needs.
pub trait Prompt {
    /// Read a free-form line of input.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Read input with terminal echo disabled.
    fn password(&mut self, prompt: &str) -> Result<String>;

    /// Pick one of `items`, offering `default` as the preselected row.
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize>;
}

/// `Prompt` backed by dialoguer, used by the real binary.
pub struct TermPrompt;

impl Prompt for TermPrompt {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let value: String = Input::new().with_prompt(prompt).interact_text()?;
        Ok(value)
    }

    fn password(&mut self, prompt: &str) -> Result<String> {
        let value = Password::new().with_prompt(prompt).interact()?;
        Ok(value)
    }

    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        let index = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?;
        Ok(index)
    }
}

/// Spinner shown while a network call is in flight.
fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    pb.set_message(msg.to_string());
    pb
}

/// Resolve the account email and authentication method before any
/// network call, prompting only for what the flags did not supply.
/// With `--keychain` the password is never collected here; the client
/// looks it up in the OS credential store itself.
pub fn resolve_credentials(cli: &Cli, prompt: &mut dyn Prompt) -> Result<(String, AuthMethod)> {
    let email = match &cli.email {
        Some(email) => email.clone(),
        None => prompt.input("Account login")?,
    };

    if cli.keychain {
        return Ok((email, AuthMethod::Keychain));
    }

    let password = match &cli.password {
        Some(password) => password.clone(),
        None => prompt.password(&format!("Password for {}", email))?,
    };
    Ok((email, AuthMethod::Password(password)))
}

/// Walk the login challenge the service raised, if any. `Ok(true)`
/// means the session is usable, `Ok(false)` means verification failed
/// and the caller should stop.
pub fn check_challenge(api: &mut dyn DriveClient, prompt: &mut dyn Prompt) -> Result<bool> {
    match api.challenge() {
        ChallengeKind::None => Ok(true),
        ChallengeKind::TwoFactor => check_two_factor(api, prompt),
        ChallengeKind::TwoStep => check_two_step(api, prompt),
    }
}

/// Modern flow: one code, pushed by the service to every approved
/// device. A session left untrusted after a valid code only costs the
/// user a repeat challenge in a later session, so trust failure is a
/// warning rather than a flow failure.
fn check_two_factor(api: &mut dyn DriveClient, prompt: &mut dyn Prompt) -> Result<bool> {
    println!("Two-factor authentication required.");
    let code = prompt.input("Enter the code you received on one of your approved devices")?;
    if !api.validate_2fa_code(&code)? {
        println!("Failed to verify security code");
        return Ok(false);
    }

    if !api.is_trusted_session() {
        println!("Session is not trusted. Requesting trust...");
        if !api.trust_session()? {
            println!("Failed to request trust. You will likely be prompted for the code again in the coming weeks");
        }
    }
    Ok(true)
}

/// Legacy flow: the user picks a trusted device, the service sends a
/// code to it, and the code is validated against that same device.
fn check_two_step(api: &mut dyn DriveClient, prompt: &mut dyn Prompt) -> Result<bool> {
    println!("Two-step authentication required. Your trusted devices are:");

    let devices = api.trusted_devices()?;
    if devices.is_empty() {
        println!("No trusted devices are registered on this account");
        return Ok(false);
    }

    let labels: Vec<String> = devices.iter().map(TrustedDevice::label).collect();
    for (i, label) in labels.iter().enumerate() {
        println!("  {}: {}", i, label);
    }

    let index = prompt.select("Which device would you like to use?", &labels, 0)?;
    let device = match devices.get(index) {
        Some(device) => device,
        None => {
            println!("Device selection {} is out of range", index);
            return Ok(false);
        }
    };

    if !api.send_verification_code(device)? {
        println!("Failed to send verification code");
        return Ok(false);
    }

    let code = prompt.input("Please enter validation code")?;
    if !api.validate_verification_code(device, &code)? {
        println!("Failed to verify verification code");
        return Ok(false);
    }
    Ok(true)
}

/// Full program flow: resolve credentials, authenticate, settle any
/// challenge, print the root listing. Returns the process exit code so
/// `main` stays a thin wrapper around it.
pub fn run(cli: &Cli, api: &mut dyn DriveClient, prompt: &mut dyn Prompt) -> Result<i32> {
    let (email, method) = resolve_credentials(cli, prompt)?;

    let pb = spinner("Signing in...");
    let login = api.login(&email, &method);
    pb.finish_and_clear();
    login?;

    if !check_challenge(api, prompt)? {
        println!("Two-factor authentication failure.");
        return Ok(1);
    }

    let pb = spinner("Listing drive root...");
    let entries = api.list_root();
    pb.finish_and_clear();
    for entry in entries? {
        println!("{}", entry);
    }
    Ok(0)
}
