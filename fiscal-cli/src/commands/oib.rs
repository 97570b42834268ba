use std::io::{self, Write};

use fiscal_core::calculations::validate_oib;
use serde::Serialize;
use tracing::debug;

use super::Render;
use crate::cli::OibArgs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OibCheck {
    pub oib: String,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OibReport {
    pub results: Vec<OibCheck>,
}

impl OibReport {
    pub fn all_valid(&self) -> bool {
        self.results.iter().all(|r| r.valid)
    }
}

pub fn run(args: &OibArgs) -> OibReport {
    let results = args
        .oibs
        .iter()
        .map(|oib| {
            let valid = validate_oib(oib);
            debug!(oib = %oib, valid, "checked OIB");
            OibCheck {
                oib: oib.trim().to_string(),
                valid,
            }
        })
        .collect();

    OibReport { results }
}

impl Render for OibReport {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        for check in &self.results {
            let verdict = if check.valid { "valid" } else { "invalid" };
            writeln!(out, "{:<13} {verdict}", check.oib)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(oibs: &[&str]) -> OibArgs {
        OibArgs {
            oibs: oibs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn reports_each_oib() {
        let report = run(&args(&["12345678903", "12345678901"]));

        assert_eq!(
            report.results,
            vec![
                OibCheck {
                    oib: "12345678903".to_string(),
                    valid: true,
                },
                OibCheck {
                    oib: "12345678901".to_string(),
                    valid: false,
                },
            ]
        );
        assert!(!report.all_valid());
    }

    #[test]
    fn text_output_lists_verdicts() {
        let report = run(&args(&["69435151530"]));
        let mut out = Vec::new();

        report.render(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "69435151530   valid\n");
    }
}
