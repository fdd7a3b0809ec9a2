use flexi_logger::{opt_format, Cleanup, Criterion, FileSpec, Logger, Naming};

/// Starts the logger, reading the level from `RUST_LOG`/`RUST_LOG` env var
/// with an `info` fallback. When `log_dir` is given, logs rotate to disk;
/// otherwise they go to stderr with color, which is the more useful default
/// for running the engine under a process supervisor.
pub fn setup_logging(log_dir: Option<&str>) -> Result<(), flexi_logger::FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str("info")?;

    match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir))
            .format(opt_format)
            .rotate(
                Criterion::Size(10 * 1024 * 1024),
                Naming::Numbers,
                Cleanup::KeepLogFiles(5),
            )
            .start()?,
        None => logger.format(flexi_logger::colored_default_format).start()?,
    };
    Ok(())
}