use anyhow::Context;
use clap::Parser;

use orrery::{
    app::OrreryApp,
    celestial::Catalog,
    config::{Cli, OrreryConfig},
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Some(path) = &cli.write_default_config {
        OrreryConfig::default()
            .save(path)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        log::info!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = OrreryConfig::from_cli(&cli).context("loading configuration")?;
    let app = OrreryApp::new(config, &Catalog::builtin()).context("building the solar system")?;
    app.run().context("orrery stopped")?;
    Ok(())
}
