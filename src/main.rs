use clap::Parser;
use taskpad::cli::commands::Cli;
use taskpad::cli::handlers;

fn main() {
    let cli = Cli::parse();
    taskpad::logging::init(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
