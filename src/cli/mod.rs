//! # CLI Module
//!
//! Command-line front end of the `gogen` binary. Flags are parsed with
//! `clap`, merged over the optional `gogen.toml` and handed to
//! [`generator::generate`](crate::generator::generate).
//!
//! ## Commands
//!
//! ```bash
//! gogen option --type Config ./pkg
//! gogen union --type Shape ./pkg
//! gogen syncmap --type 'UserMap<string, *User>' ./pkg
//! gogen atomicvalue --type 'Snapshot<*State>' ./pkg
//! gogen enum --type Color --trimprefix Color ./pkg
//! gogen sqlx --type User --table users --fill-tags ./pkg
//! gogen inspect --type Config ./pkg
//! ```
//!
//! Every generator accepts `--output`, `--tags`, `--unexported`,
//! `--gofmt`, `--force`, `--dry-run`, `--config` and `--verbose`.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use gogen::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands, GenerateArgs, ScanArgs};
