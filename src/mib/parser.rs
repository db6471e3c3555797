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

//! Best-effort extraction of OID-valued symbols from MIB files.
//!
//! This is not a full SMI grammar parser. It recognizes the assignment
//! forms that bind a name to an object identifier and resolves them
//! against the well-known tree roots plus whatever the same module
//! already defined. Unresolvable symbols are dropped; a file without a
//! `DEFINITIONS ::= BEGIN` header is rejected so the directory scan can
//! count it as skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

/// One OID-valued symbol declared by a MIB module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MibSymbol {
    /// The declaring module, e.g. `IF-MIB`.
    pub module: String,
    /// The declared name, e.g. `ifInOctets`.
    pub name: String,
    /// The resolved numeric OID in dotted-decimal form.
    pub oid: String,
}

static RE_MODULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*([A-Za-z][A-Za-z0-9-]*)\s+DEFINITIONS\s*::=\s*BEGIN").unwrap()
});

/// Start of a declaration that can carry an OID assignment.
static RE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*([a-z][A-Za-z0-9-]*)\s+(?:OBJECT\s+IDENTIFIER|OBJECT-TYPE|OBJECT-IDENTITY|MODULE-IDENTITY|NOTIFICATION-TYPE|OBJECT-GROUP|NOTIFICATION-GROUP)\b",
    )
    .unwrap()
});

static RE_ASSIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"::=\s*\{([^}]+)\}").unwrap());

/// Roots every module may reference without defining them.
const WELL_KNOWN: [(&str, &str); 15] = [
    ("ccitt", "0"),
    ("zeroDotZero", "0.0"),
    ("iso", "1"),
    ("org", "1.3"),
    ("dod", "1.3.6"),
    ("internet", "1.3.6.1"),
    ("directory", "1.3.6.1.1"),
    ("mgmt", "1.3.6.1.2"),
    ("mib-2", "1.3.6.1.2.1"),
    ("transmission", "1.3.6.1.2.1.10"),
    ("experimental", "1.3.6.1.3"),
    ("private", "1.3.6.1.4"),
    ("enterprises", "1.3.6.1.4.1"),
    ("security", "1.3.6.1.5"),
    ("snmpV2", "1.3.6.1.6"),
];

/// Parse one file, returning every symbol whose value resolves to an
/// object identifier.
pub fn parse_file(path: &Path) -> Result<Vec<MibSymbol>> {
    let raw = fs::read(path)?;
    let text = String::from_utf8_lossy(&raw);
    parse_module(&text)
}

/// Parse MIB module text. Exposed separately so tests can feed snippets.
pub fn parse_module(text: &str) -> Result<Vec<MibSymbol>> {
    let module = RE_MODULE
        .captures(text)
        .map(|c| c[1].to_string())
        .ok_or_else(|| Error::MibParse("missing DEFINITIONS header".to_string()))?;

    let text = strip_comments(text);
    let decls = collect_declarations(&text);

    let mut known: HashMap<String, String> = WELL_KNOWN
        .iter()
        .map(|(n, o)| (n.to_string(), o.to_string()))
        .collect();
    let mut pending: Vec<(String, Vec<OidToken>)> = decls;
    let mut symbols = Vec::new();

    // definitions may appear out of order; iterate until no progress
    loop {
        let mut progressed = false;
        let mut still_pending = Vec::new();
        for (name, tokens) in pending {
            match resolve(&tokens, &known) {
                Some(oid) => {
                    known.insert(name.clone(), oid.clone());
                    symbols.push(MibSymbol {
                        module: module.clone(),
                        name,
                        oid,
                    });
                    progressed = true;
                }
                None => still_pending.push((name, tokens)),
            }
        }
        pending = still_pending;
        if !progressed || pending.is_empty() {
            break;
        }
    }

    if !pending.is_empty() {
        debug!(
            module,
            unresolved = pending.len(),
            "dropping symbols with unresolvable parents"
        );
    }
    Ok(symbols)
}

#[derive(Debug, Clone)]
enum OidToken {
    /// A bare sub-identifier, e.g. `1`.
    Number(u64),
    /// A symbol reference, optionally with its number: `org` or `org(3)`.
    Named(String, Option<u64>),
}

/// Find every declaration and its `::= { ... }` body. A declaration's
/// body extends to the start of the next declaration.
fn collect_declarations(text: &str) -> Vec<(String, Vec<OidToken>)> {
    let starts: Vec<(usize, String)> = RE_DECL
        .captures_iter(text)
        .map(|c| (c.get(0).unwrap().start(), c[1].to_string()))
        .collect();

    let mut out = Vec::new();
    for (i, (start, name)) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .map(|(s, _)| *s)
            .unwrap_or(text.len());
        let body = &text[*start..end];
        if let Some(assign) = RE_ASSIGN.captures(body) {
            if let Some(tokens) = tokenize(&assign[1]) {
                out.push((name.clone(), tokens));
            }
        }
    }
    out
}

fn tokenize(body: &str) -> Option<Vec<OidToken>> {
    let mut tokens = Vec::new();
    for word in body.split_whitespace() {
        if let Ok(n) = word.parse::<u64>() {
            tokens.push(OidToken::Number(n));
        } else if let Some((name, rest)) = word.split_once('(') {
            let n = rest.strip_suffix(')')?.parse::<u64>().ok()?;
            tokens.push(OidToken::Named(name.to_string(), Some(n)));
        } else {
            tokens.push(OidToken::Named(word.to_string(), None));
        }
    }
    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

/// Resolve a token chain to a dotted OID, or `None` if the leading
/// symbol is not (yet) known.
fn resolve(tokens: &[OidToken], known: &HashMap<String, String>) -> Option<String> {
    let mut oid = String::new();
    for (i, token) in tokens.iter().enumerate() {
        let component = match token {
            OidToken::Number(n) => *n,
            OidToken::Named(name, numbered) => {
                if i == 0 {
                    if let Some(base) = known.get(name) {
                        oid = base.clone();
                        continue;
                    }
                }
                // mid-chain named arcs like org(3) carry their number
                match numbered {
                    Some(n) => *n,
                    None => return None,
                }
            }
        };
        if oid.is_empty() {
            oid = component.to_string();
        } else {
            oid = format!("{oid}.{component}");
        }
    }
    Some(oid)
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find("--") {
            Some(pos) => &line[..pos],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
