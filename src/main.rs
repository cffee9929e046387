mod app;
mod background;
mod boot;
mod bus;
mod canvas;
mod config;
mod content;
mod cursor;
mod input;
mod logging;
mod page;
mod particles;
mod shell;
mod term;
mod theme;
mod typewriter;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
