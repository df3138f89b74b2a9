use clap::Parser;
use ferrum_tables::cli::{
    self,
    parsers::{CliMode, CliParser},
};
use log::error;

fn main() {
    let args = CliParser::parse();

    let config = match cli::resolve_config(args.order) {
        Ok(config) => config,
        Err(msg) => {
            error!("err: {}", msg);
            eprintln!("err: {}", msg);
            std::process::exit(2);
        }
    };

    let outcome = match args.mode {
        Some(CliMode::Demo) => cli::run_demo(config, args.json),
        Some(CliMode::Config) => {
            cli::show_config(&config);
            Ok(())
        }
        None => Ok(()),
    };

    if let Err(msg) = outcome {
        error!("err: {}", msg);
        eprintln!("err: {}", msg);
        std::process::exit(1);
    }
}
