mod app;
mod config;
mod mpris;
mod player;
mod runtime;
mod track;
mod ui;
mod visual;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
