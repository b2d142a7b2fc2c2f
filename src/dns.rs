use std::net::Ipv4Addr;

use serde::Deserialize;

use crate::cmd::CommandRunner;
use crate::error::{ProvisionError, ProvisionResult};
use crate::prereq;

#[derive(Debug, Deserialize)]
struct PublicIp {
    ip: String,
}

/// Checks that a domain's A record points at this machine. One
/// attempt only; propagation delays surface as errors.
pub struct DnsVerifier<'a> {
    runner: &'a dyn CommandRunner,
    public_ip_url: String,
}

impl<'a> DnsVerifier<'a> {
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, public_ip_url: &str) -> Self {
        Self {
            runner,
            public_ip_url: public_ip_url.to_string(),
        }
    }

    /// The machine's externally visible IPv4 address.
    pub fn public_ip(&self) -> ProvisionResult<Ipv4Addr> {
        let body = self
            .runner
            .run("curl", &["-fsS", "--max-time", "10", &self.public_ip_url])
            .map_err(|e| {
                ProvisionError::DnsLookup(format!("cannot determine public IP: {}", e.detail()))
            })?;

        let parsed: PublicIp = serde_json::from_str(&body).map_err(|e| {
            ProvisionError::DnsLookup(format!(
                "public IP service {} returned invalid JSON: {e}",
                self.public_ip_url
            ))
        })?;
        parsed.ip.trim().parse().map_err(|_| {
            ProvisionError::DnsLookup(format!(
                "public IP service returned '{}'",
                parsed.ip
            ))
        })
    }

    /// All A records for `domain`.
    pub fn resolve_a(&self, domain: &str) -> ProvisionResult<Vec<Ipv4Addr>> {
        prereq::ensure(self.runner, &prereq::DIG)?;

        let output = self
            .runner
            .run("dig", &["+short", "A", domain])
            .map_err(|e| ProvisionError::DnsLookup(format!("{domain}: {}", e.detail())))?;

        let records = parse_a_records(&output);
        if records.is_empty() {
            return Err(ProvisionError::DnsLookup(format!(
                "{domain} has no A record"
            )));
        }
        Ok(records)
    }

    /// Succeed only if one of the domain's A records equals the
    /// public IP of this machine.
    pub fn verify(&self, domain: &str) -> ProvisionResult<Ipv4Addr> {
        tracing::info!("verifying DNS for {domain}");

        let expected = self.public_ip()?;
        tracing::info!("public IP: {expected}");

        let records = self.resolve_a(domain)?;
        if !records.contains(&expected) {
            let actual = records
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ProvisionError::DnsMismatch {
                domain: domain.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }

        tracing::info!("{domain} resolves to {expected}");
        Ok(expected)
    }
}

/// Extract IPv4 addresses from `dig +short` output. CNAME targets
/// in the chain are skipped.
#[must_use]
pub fn parse_a_records(output: &str) -> Vec<Ipv4Addr> {
    output
        .lines()
        .filter_map(|l| l.trim().parse().ok())
        .collect()
}
