//! `chartseal verify`: check a package against its `<package>.prov`.

use crate::config::Config;
use crate::error_printer::{print_success, ErrorPrinterConfig};
use anyhow::{Context, Result};
use chartseal_prov::verify_package;

pub fn cmd_verify(config: &Config) -> Result<()> {
    let package = config.package()?;
    let signer = config.signer.build().context("could not configure signer")?;

    let outcome = verify_package(package, &*signer)
        .with_context(|| format!("failed to verify {}", package.display()))?;

    let printer = ErrorPrinterConfig::default();
    print_success(
        &format!("Checksum sha256:{} matches", outcome.checksum),
        &printer,
    );
    print_success(
        &format!("Signature in {} is valid", outcome.provenance_path.display()),
        &printer,
    );
    print_success("Helm package successfully verified", &printer);
    Ok(())
}
