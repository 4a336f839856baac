use anyhow::Result;
use gridpaint::cli;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };
    // CLI --log-level flag takes highest precedence, then RUST_LOG, then config.
    gridpaint::debug::init_log_bridge(options.log_level);

    log::info!("Starting gridpaint {}", gridpaint::VERSION);

    let result = cli::load_config(options.config.as_ref())
        .and_then(|config| {
            gridpaint::debug::set_level(config.log_level, options.log_level);
            gridpaint::replay::run(&options.replay, config)
        });

    match result {
        Ok(stats) => {
            println!(
                "{}: {} batches, {} events",
                options.replay.output.display(),
                stats.batches,
                stats.events
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("gridpaint: error: {e:#}");
            log::logger().flush();
            std::process::exit(1);
        }
    }
}
