use lift::modules;
use lift::utilities::debug::DEFAULT_LOG_LEVEL;
use lift::utilities::error::LiftError;
use shared_resources::config::Config;

fn main() -> Result<(), LiftError> {
    env_logger::Builder::new()
        .filter_level(DEFAULT_LOG_LEVEL)
        .parse_default_env()
        .init();

    // READ CONFIGURATION
    let config = Config::get()?;

    modules::run(config)
}
