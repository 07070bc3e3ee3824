use burrow_core::pkg::InstallReport;
use burrow_core::{Config, Installer, PackageSpec};
use miette::{IntoDiagnostic, Result};
use tracing::{debug, info};

/// Run the install command.
///
/// Every argument is parsed and installed in order with one shared
/// [`Installer`], so a package reached twice is only processed once per run.
/// A failing argument is reported and skipped; the rest still install.
pub fn run(config: &Config, specs: &[String]) -> Result<()> {
    info!(
        cwd = %config.cwd.display(),
        registry = %config.registry_url,
        cache = %config.cache_dir.display(),
        "INSTALL command invoked"
    );

    let mut installer = Installer::from_config(config).into_diagnostic()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    runtime.block_on(async {
        for arg in specs {
            install_one(&mut installer, arg).await;
        }
    });

    println!("All packages installed.");
    Ok(())
}

async fn install_one(installer: &mut Installer, arg: &str) {
    let spec = match PackageSpec::parse(arg) {
        Ok(spec) => spec,
        Err(e) => {
            println!("Error parsing package '{arg}': {e}");
            return;
        }
    };

    match installer.install(&spec).await {
        Ok(report) => print_report(&spec, &report),
        Err(e) => println!("Error installing package '{arg}': {e}"),
    }
}

fn print_report(spec: &PackageSpec, report: &InstallReport) {
    if report.installed.is_empty() {
        debug!(spec = %spec, "Nothing new to install");
        return;
    }

    for pkg in &report.installed {
        let source = if pkg.from_cache { "cached" } else { "downloaded" };
        println!("+ {}@{} ({source})", pkg.name, pkg.version);
    }
}
