mod common;

use std::net::Ipv4Addr;

use common::{APT_INSTALL, PUBLIC_IP, ScriptedRunner};
use n8n_provision::DnsVerifier;
use n8n_provision::error::ProvisionError;

const IP_URL: &str = "https://ip.test/?format=json";

#[test]
fn matching_record_verifies() {
    let runner = ScriptedRunner::healthy_host();

    let ip = DnsVerifier::new(&runner, IP_URL)
        .verify("dev.example.com")
        .unwrap();

    assert_eq!(ip, PUBLIC_IP.parse::<Ipv4Addr>().unwrap());
    assert!(runner.called("dig +short A dev.example.com"));
    assert!(runner.called(&format!("curl -fsS --max-time 10 {IP_URL}")));
}

#[test]
fn mismatch_reports_both_addresses() {
    let runner = ScriptedRunner::healthy_host().respond("dig +short A", "198.51.100.1");

    let err = DnsVerifier::new(&runner, IP_URL)
        .verify("dev.example.com")
        .unwrap_err();

    match err {
        ProvisionError::DnsMismatch {
            domain,
            expected,
            actual,
        } => {
            assert_eq!(domain, "dev.example.com");
            assert_eq!(expected, PUBLIC_IP);
            assert_eq!(actual, "198.51.100.1");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_record_is_lookup_error() {
    let runner = ScriptedRunner::healthy_host().respond("dig +short A", "");

    let err = DnsVerifier::new(&runner, IP_URL)
        .verify("dev.example.com")
        .unwrap_err();

    assert!(matches!(err, ProvisionError::DnsLookup(_)));
    assert!(err.to_string().contains("no A record"));
}

#[test]
fn record_behind_cname_verifies() {
    let runner = ScriptedRunner::healthy_host()
        .respond("dig +short A", &format!("edge.example.net.\n{PUBLIC_IP}"));

    assert!(
        DnsVerifier::new(&runner, IP_URL)
            .verify("dev.example.com")
            .is_ok()
    );
}

#[test]
fn any_of_several_records_may_match() {
    let runner = ScriptedRunner::healthy_host()
        .respond("dig +short A", &format!("198.51.100.1\n{PUBLIC_IP}"));

    assert!(
        DnsVerifier::new(&runner, IP_URL)
            .verify("dev.example.com")
            .is_ok()
    );
}

#[test]
fn single_attempt_only() {
    let runner = ScriptedRunner::healthy_host().respond("dig +short A", "");

    let _ = DnsVerifier::new(&runner, IP_URL).verify("dev.example.com");

    assert_eq!(runner.count("dig"), 1);
    assert_eq!(runner.count("curl"), 1);
}

#[test]
fn public_ip_failure_is_lookup_error() {
    let runner = ScriptedRunner::healthy_host().fail("curl", "could not resolve host");

    let err = DnsVerifier::new(&runner, IP_URL)
        .verify("dev.example.com")
        .unwrap_err();

    assert!(matches!(err, ProvisionError::DnsLookup(_)));
    assert!(err.to_string().contains("could not resolve host"));
    assert!(!runner.called("dig"));
}

#[test]
fn garbage_public_ip_is_lookup_error() {
    let runner = ScriptedRunner::healthy_host().respond("curl", r#"{"ip":"not-an-ip"}"#);

    let err = DnsVerifier::new(&runner, IP_URL).public_ip().unwrap_err();

    assert!(matches!(err, ProvisionError::DnsLookup(_)));
}

#[test]
fn non_json_public_ip_reply_is_lookup_error() {
    let runner = ScriptedRunner::healthy_host().respond("curl", "<html>502 Bad Gateway</html>");

    let err = DnsVerifier::new(&runner, IP_URL)
        .verify("dev.example.com")
        .unwrap_err();

    assert!(matches!(err, ProvisionError::DnsLookup(_)));
    assert!(err.to_string().contains(IP_URL));
    assert!(!runner.called("dig"));
}

#[test]
fn installs_dig_when_missing() {
    let runner = ScriptedRunner::healthy_host().missing("dig");

    DnsVerifier::new(&runner, IP_URL)
        .verify("dev.example.com")
        .unwrap();

    let install = runner.position(&format!("{APT_INSTALL} dnsutils")).unwrap();
    let lookup = runner.position("dig +short A").unwrap();
    assert!(install < lookup);
}
