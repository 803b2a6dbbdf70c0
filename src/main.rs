use promptdeck::cli::{self, Cli, Console};
use promptdeck::logging::init_logging;
use promptdeck::{Config, SettingsStorage};

fn main() {
    let args = Cli::parse_args();
    let console = Console::new();

    let mut config = Config::default();
    if let Some(path) = args.settings {
        config = config.with_settings_path(path);
    }
    if let Some(dir) = args.log_dir {
        config = config.with_log_dir(dir);
    }

    if let Err(e) = init_logging(&config.log_dir) {
        console.print_warning(&format!("Logging disabled: {}", e));
    }

    let storage = SettingsStorage::from_config(&config);
    if let Err(e) = cli::run(args.command, storage, &console) {
        tracing::error!("Command failed: {:?}", e);
        console.print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
