//! Generate JSON Schema for the termshell config file
//!
//! Usage:
//!   cargo run --features dev-bins --bin generate_schema > config-schema.json

use schemars::schema_for;
use termshell::config::ShellConfig;

fn main() -> serde_json::Result<()> {
    let schema = schema_for!(ShellConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
