use std::env;

mod app;
mod audio;
mod backend;
mod catalog;
mod cli;
mod config;
mod mpris;
mod player;
mod runtime;
mod session;
mod shell;
mod ui;

use cli::Command;

fn main() -> anyhow::Result<()> {
    let command = Command::parse(env::args().skip(1))?;
    let settings = runtime::bootstrap();

    match command {
        Command::Tui => runtime::run(settings),
        Command::Signup { email, password } => cli::signup(&settings, &email, &password),
        Command::Avatar { file } => cli::upload_image(&settings, cli::ProfileImage::Avatar, &file),
        Command::Banner { file } => cli::upload_image(&settings, cli::ProfileImage::Banner, &file),
        Command::Profile => cli::show_profile(&settings),
    }
}
