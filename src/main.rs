mod app;
mod config;
mod error;
mod library;
mod lyrics;
mod mpris;
mod paths;
mod player;
mod recents;
mod remote;
mod runtime;
mod session;
mod theme;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
