mod cli;

use clap::Parser;

use cli::{Args, Command};
use glyphcast::logging::{init_logging, level_from_verbosity};

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(level_from_verbosity(args.verbose)) {
        eprintln!("Warning: {}", e);
    }

    let config_path = args.config.as_deref();
    let result = match args.command {
        Command::Render(render_args) => cli::render(&render_args, config_path),
        Command::Presets => {
            cli::list_presets();
            Ok(())
        }
        Command::Config { action } => cli::handle_config_action(action, config_path),
    };

    if let Err(e) = result {
        log::debug!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
