//! Command implementations.
//!
//! - `reconcile`: validate, plan, apply, destroy
//! - `tracking`: import, refresh, show
//! - `inspect`: query, schema

pub mod inspect;
pub mod reconcile;
pub mod tracking;

use anyhow::{Result, bail};
use declarative::{Address, Error};

use crate::ui;

/// Parse `type.label` targets.
pub fn parse_targets(targets: &[String]) -> Result<Vec<Address>> {
    targets.iter().map(|t| parse_address(t)).collect()
}

pub fn parse_address(s: &str) -> Result<Address> {
    match Address::parse(s) {
        Some(address) => Ok(address),
        None => bail!("Invalid resource address {s:?}: expected <type>.<label>"),
    }
}

/// Print every validation finding on its own line.
///
/// Other errors are left for the caller to propagate.
pub fn report_diagnostics(err: &Error) -> bool {
    match err {
        Error::Validation(diagnostics) => {
            for d in diagnostics {
                ui::error(&d.to_string());
            }
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Diagnostic;

    #[test]
    fn test_parse_targets() {
        let targets = parse_targets(&["sftpgo_user.alice".into(), "sftpgo_role.ops".into()])
            .unwrap();
        assert_eq!(targets[0], Address::new("sftpgo_user", "alice"));
        assert_eq!(targets[1].to_string(), "sftpgo_role.ops");
    }

    #[test]
    fn test_parse_address_rejects_bare_type() {
        let err = parse_address("sftpgo_user").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid resource address \"sftpgo_user\": expected <type>.<label>"
        );
    }

    #[test]
    fn test_report_diagnostics() {
        let validation = Error::Validation(vec![Diagnostic::new("sftpgo_user.a/status", "bad")]);
        assert!(report_diagnostics(&validation));
        assert!(!report_diagnostics(&Error::UnknownType("x".into())));
    }
}
