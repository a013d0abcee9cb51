mod app;
mod assets;
mod config;
mod input;
mod model;
mod panel;
mod render;
mod scene;
mod sim;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
