use clap::{App, Arg};
use scrivener::build::build_site;
use scrivener::config::{Config, CONFIG_FILE};
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = App::new("scrivener")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders a directory of markdown documents into a static site")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .default_value(CONFIG_FILE)
                .help("The project configuration file"),
        )
        .get_matches();

    // `default_value` guarantees a value.
    let config_file = Path::new(matches.value_of("config").unwrap_or(CONFIG_FILE));
    if let Err(err) = run(config_file) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
    println!("Done!");
}

fn run(config_file: &Path) -> anyhow::Result<()> {
    let config = Config::from_file(config_file)?;
    build_site(&config)?;
    Ok(())
}
