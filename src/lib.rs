// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) wires the real HTTP client and terminal prompts into the
// flow exported here.
//
// Module responsibilities:
// - `cli`: Command-line flag definitions (email, password, keychain).
// - `api`: The `DriveClient` capability trait, the trusted-device
//   record, and the blocking HTTP client that talks to the drive
//   gateway.
// - `ui`: Interactive credential resolution, the two-factor/two-step
//   challenge conversation, and the top-level `run` flow.
//
// Keeping the seams in `api` and `ui` as narrow traits makes it
// possible to test the whole login conversation with scripted doubles
// instead of a live service.
pub mod api;
pub mod cli;
pub mod ui;
