// Copyright 2025 the snmpscope authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Walk an agent's tree and print every entry with resolved names.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use snmpscope::common::config::AppConfig;
use snmpscope::{walk, MibIndex, SnmpEndpoint, SnmpSession};

#[derive(Parser, Debug)]
#[command(name = "snmpwalk", about = "Walk an SNMP agent's object tree")]
struct Cli {
    /// Host to walk
    host: String,

    /// Community string
    #[arg(short, long, default_value = AppConfig::DEFAULT_COMMUNITY)]
    community: String,

    /// OID to start the walk from
    #[arg(short, long, default_value = AppConfig::DEFAULT_START_OID)]
    oid: String,

    /// Also print octet-string values as raw hex
    #[arg(short = 'd', long)]
    debug_hex: bool,
}

/// Parse arguments, exiting 1 on a usage error (0 for help/version).
fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        std::process::exit(code);
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = parse_cli();
    let mib = MibIndex::with_system_mibs();

    let endpoint = SnmpEndpoint::new(cli.host.clone()).with_community(cli.community.clone());
    let mut session = SnmpSession::connect(endpoint).await;

    let result = match walk::walk(&mut session, &cli.oid).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}: {e}", cli.host);
            std::process::exit(1);
        }
    };

    for entry in &result {
        println!(
            "{} = {}: {}",
            mib.prettify(entry.oid()),
            entry.type_string(),
            entry.nice_string()
        );
        if cli.debug_hex {
            if let Some(hex) = entry.hex_string() {
                println!("  (hex: {hex})");
            }
        }
    }

    if result.skipped() > 0 {
        eprintln!("warning: walk ended after a failed probe");
    }
}
