// API client module: a small blocking HTTP client that talks to the
// drive gateway, plus the narrow `DriveClient` trait the interactive
// flows are written against so tests can substitute a scripted client.

use anyhow::{Context, Result};
use keyring::Entry;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Service name under which passwords live in the OS credential store.
const KEYRING_SERVICE: &str = "drivescope";

/// Which login challenge, if any, the service raised for this session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChallengeKind {
    /// The session is usable as-is.
    #[default]
    None,
    /// Modern flow: a single code pushed to every approved device.
    TwoFactor,
    /// Legacy flow: pick a trusted device and have a code sent to it.
    TwoStep,
}

/// How the account password reaches the service.
#[derive(Clone, Debug)]
pub enum AuthMethod {
    /// Send this password with the login request.
    Password(String),
    /// Look the password up in the OS credential store for the account
    /// email. The caller never sees the password itself.
    Keychain,
}

/// A device the account owner has approved for verification codes.
/// Field names mirror the gateway's JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedDevice {
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl TrustedDevice {
    /// Label shown in the device-selection prompt. A device without a
    /// display name falls back to the number the SMS would go to.
    pub fn label(&self) -> String {
        match (&self.device_name, &self.phone_number) {
            (Some(name), _) => name.clone(),
            (None, Some(phone)) => format!("SMS to {}", phone),
            (None, None) => "SMS to unknown number".to_string(),
        }
    }
}

/// Capability set of the remote authentication/storage service. The
/// flows in `ui` only ever talk to this trait, never to reqwest.
pub trait DriveClient {
    /// Authenticate the account. With `AuthMethod::Keychain` the client
    /// resolves the password itself from the OS credential store.
    fn login(&mut self, email: &str, method: &AuthMethod) -> Result<()>;

    /// Which challenge the last login raised.
    fn challenge(&self) -> ChallengeKind;

    /// Whether the service already trusts this session.
    fn is_trusted_session(&self) -> bool;

    /// Submit a two-factor code. `Ok(false)` means the code was rejected.
    fn validate_2fa_code(&mut self, code: &str) -> Result<bool>;

    /// Ask the service to trust this session so future logins skip the
    /// challenge. `Ok(false)` means the request was declined.
    fn trust_session(&mut self) -> Result<bool>;

    /// Devices approved to receive two-step verification codes.
    fn trusted_devices(&mut self) -> Result<Vec<TrustedDevice>>;

    /// Have a verification code delivered to the given device.
    fn send_verification_code(&mut self, device: &TrustedDevice) -> Result<bool>;

    /// Submit the code received on the given device.
    fn validate_verification_code(&mut self, device: &TrustedDevice, code: &str) -> Result<bool>;

    /// Names of the entries at the root of the remote drive.
    fn list_root(&mut self) -> Result<Vec<String>>;
}

/// Login request payload. With keychain authentication the password is
/// resolved client-side before this is built.
#[derive(Serialize, Debug)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Challenge flags returned by the login endpoint. Missing fields read
/// as false so older gateway builds keep working.
#[derive(Deserialize, Debug)]
struct LoginResponse {
    #[serde(default)]
    requires_2fa: bool,
    #[serde(default)]
    requires_2sa: bool,
    #[serde(default)]
    trusted_session: bool,
}

#[derive(Serialize, Debug)]
struct CodeRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize, Debug)]
struct VerifyResponse {
    accepted: bool,
    #[serde(default)]
    trusted_session: bool,
}

#[derive(Deserialize, Debug)]
struct TrustResponse {
    trusted: bool,
}

#[derive(Deserialize, Debug)]
struct DeviceListResponse {
    devices: Vec<TrustedDevice>,
}

#[derive(Serialize, Debug)]
struct SendCodeRequest<'a> {
    device: &'a TrustedDevice,
}

#[derive(Deserialize, Debug)]
struct SendCodeResponse {
    sent: bool,
}

#[derive(Serialize, Debug)]
struct DeviceCodeRequest<'a> {
    device: &'a TrustedDevice,
    code: &'a str,
}

#[derive(Deserialize, Debug)]
struct ListingResponse {
    entries: Vec<String>,
}

/// Blocking HTTP implementation of `DriveClient`. Holds a reqwest
/// client with an enabled cookie store, the base URL of the drive
/// gateway, and the challenge flags from the last login. Session and
/// trust cookies ride along automatically.
pub struct HttpDriveClient {
    client: Client,
    base_url: String,
    requires_2fa: bool,
    requires_2sa: bool,
    trusted_session: bool,
}

impl HttpDriveClient {
    /// Create a client configured from the environment variable
    /// `DRIVE_GATEWAY_URL` or fallback to `http://localhost:8000`.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("DRIVE_GATEWAY_URL").unwrap_or_else(|_| "http://localhost:8000".into());
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpDriveClient {
            client,
            base_url,
            requires_2fa: false,
            requires_2sa: false,
            trusted_session: false,
        })
    }

    /// Resolve the account password from the OS credential store.
    fn keychain_password(&self, email: &str) -> Result<String> {
        let entry =
            Entry::new(KEYRING_SERVICE, email).context("Failed to open system keychain entry")?;
        entry
            .get_password()
            .with_context(|| format!("No keychain password stored for {}", email))
    }

    /// POST `body` as JSON and parse the JSON reply. Non-success
    /// statuses become an error carrying the server's response text.
    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .json(body)
            .send()
            .with_context(|| format!("Failed to send {} request", action))?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("{} failed: {} - {}", action, status, txt);
        }
        res.json()
            .with_context(|| format!("Parsing {} response json", action))
    }

    /// GET `path` and parse the JSON reply.
    fn get_json<T: DeserializeOwned>(&self, path: &str, action: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to send {} request", action))?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("{} failed: {} - {}", action, status, txt);
        }
        res.json()
            .with_context(|| format!("Parsing {} response json", action))
    }
}

impl DriveClient for HttpDriveClient {
    fn login(&mut self, email: &str, method: &AuthMethod) -> Result<()> {
        let keychain_password;
        let password = match method {
            AuthMethod::Password(password) => password.as_str(),
            AuthMethod::Keychain => {
                keychain_password = self.keychain_password(email)?;
                keychain_password.as_str()
            }
        };

        let resp: LoginResponse =
            self.post_json("/auth", &LoginRequest { email, password }, "Login")?;
        self.requires_2fa = resp.requires_2fa;
        self.requires_2sa = resp.requires_2sa;
        self.trusted_session = resp.trusted_session;
        Ok(())
    }

    fn challenge(&self) -> ChallengeKind {
        if self.requires_2fa {
            ChallengeKind::TwoFactor
        } else if self.requires_2sa {
            ChallengeKind::TwoStep
        } else {
            ChallengeKind::None
        }
    }

    fn is_trusted_session(&self) -> bool {
        self.trusted_session
    }

    fn validate_2fa_code(&mut self, code: &str) -> Result<bool> {
        let resp: VerifyResponse =
            self.post_json("/auth/verify", &CodeRequest { code }, "Code validation")?;
        if resp.accepted {
            self.requires_2fa = false;
            self.trusted_session = resp.trusted_session;
        }
        Ok(resp.accepted)
    }

    fn trust_session(&mut self) -> Result<bool> {
        let resp: TrustResponse =
            self.post_json("/auth/trust", &serde_json::json!({}), "Trust request")?;
        self.trusted_session = resp.trusted;
        Ok(resp.trusted)
    }

    fn trusted_devices(&mut self) -> Result<Vec<TrustedDevice>> {
        let resp: DeviceListResponse = self.get_json("/auth/devices", "Device listing")?;
        Ok(resp.devices)
    }

    fn send_verification_code(&mut self, device: &TrustedDevice) -> Result<bool> {
        let resp: SendCodeResponse = self.post_json(
            "/auth/devices/send",
            &SendCodeRequest { device },
            "Verification send",
        )?;
        Ok(resp.sent)
    }

    fn validate_verification_code(&mut self, device: &TrustedDevice, code: &str) -> Result<bool> {
        let resp: VerifyResponse = self.post_json(
            "/auth/devices/verify",
            &DeviceCodeRequest { device, code },
            "Verification code validation",
        )?;
        if resp.accepted {
            self.requires_2sa = false;
        }
        Ok(resp.accepted)
    }

    fn list_root(&mut self) -> Result<Vec<String>> {
        let resp: ListingResponse = self.get_json("/drive/root", "Drive listing")?;
        Ok(resp.entries)
    }
}
