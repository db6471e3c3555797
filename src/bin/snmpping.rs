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

//! Reachability probe: one GET per host, print the answer or the error.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use snmpscope::common::config::AppConfig;
use snmpscope::{SnmpEndpoint, SnmpSession};

#[derive(Parser, Debug)]
#[command(name = "snmpping", about = "Probe SNMP agents with a single GET")]
struct Cli {
    /// Hosts to probe
    #[arg(default_value = "localhost")]
    hosts: Vec<String>,

    /// Community string
    #[arg(short, long, default_value = AppConfig::DEFAULT_COMMUNITY)]
    community: String,

    /// OID to fetch from each host
    #[arg(short, long, default_value = AppConfig::DEFAULT_PING_OID)]
    oid: String,
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
    let mut failures = 0;

    for host in &cli.hosts {
        let endpoint = SnmpEndpoint::new(host.clone()).with_community(cli.community.clone());
        let mut session = SnmpSession::connect(endpoint).await;
        match session.get(&cli.oid).await {
            Ok(metric) => println!("{host}: {} = {}", metric.oid(), metric.nice_string()),
            Err(e) => {
                eprintln!("{host}: {e}");
                failures += 1;
            }
        }
    }

    if failures == cli.hosts.len() {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_flag_is_a_usage_error() {
        let err = Cli::try_parse_from(["snmpping", "--bogus-flag"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_help_is_not_a_usage_error() {
        let err = Cli::try_parse_from(["snmpping", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }

    #[test]
    fn test_defaults_apply_without_args() {
        let cli = Cli::try_parse_from(["snmpping"]).unwrap();
        assert_eq!(cli.hosts, vec!["localhost".to_string()]);
        assert_eq!(cli.community, AppConfig::DEFAULT_COMMUNITY);
        assert_eq!(cli.oid, AppConfig::DEFAULT_PING_OID);
    }
}
