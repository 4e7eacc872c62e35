use anyhow::Context;
use haunted_house::{HauntedHouseApp, SceneConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(&path)
            .with_context(|| format!("failed to load scene config from {path}"))?,
        None => SceneConfig::default(),
    };

    let app = HauntedHouseApp::new(config).context("failed to create the application")?;
    app.run().context("haunted house exited with an error")
}
