//! `chartseal sign`: write `<package>.prov` (or print it) for a packaged chart.

use crate::config::Config;
use crate::error_printer::{print_success, ErrorPrinterConfig};
use anyhow::{Context, Result};
use chartseal_prov::{sign_package, Output};
use std::io;
use tracing::debug;

pub fn cmd_sign(config: &Config) -> Result<()> {
    let package = config.package()?;
    let signer = config.signer.build().context("could not configure signer")?;
    debug!(package = %package.display(), stdout = config.stdout, "signing package");

    let result = if config.stdout {
        let mut stdout = io::stdout().lock();
        sign_package(package, &*signer, Output::Writer(&mut stdout))
    } else {
        sign_package(package, &*signer, Output::ProvenanceFile)
    };
    let signed = result.with_context(|| format!("failed to sign {}", package.display()))?;

    let message = match &signed.written_to {
        Some(path) => format!(
            "Signed Helm package {} ({})",
            package.display(),
            path.display()
        ),
        None => format!("Signed Helm package {}", package.display()),
    };
    print_success(&message, &ErrorPrinterConfig::default());
    Ok(())
}
