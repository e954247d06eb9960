use std::path::Path;
use std::process;

use anyhow::{self, format_err, Context};
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use qredux::interfaces::cli::{log_heading, Cli};
use qredux::interfaces::input::Input;
use qredux::interfaces::InputHandle;
use qredux::io::read_qredux_yaml;

/// Configures `log4rs` so that the `qredux-output` logger writes to the terminal and, if
/// requested, to `<output>.out`, while all other log messages go to standard error.
fn configure_logging(output: Option<&Path>, debug: bool) -> Result<(), anyhow::Error> {
    let output_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();
    let diagnostic_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}",
        )))
        .build();

    let mut output_appenders = vec!["qredux-output-console".to_string()];
    let mut builder = Config::builder()
        .appender(Appender::builder().build("qredux-output-console", Box::new(output_appender)))
        .appender(Appender::builder().build("diagnostics", Box::new(diagnostic_appender)));
    if let Some(output) = output {
        let file_appender = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{m}{n}")))
            .append(false)
            .build(output.with_extension("out"))
            .with_context(|| {
                format!("Unable to create the output file for `{}`", output.display())
            })?;
        builder = builder
            .appender(Appender::builder().build("qredux-output-file", Box::new(file_appender)));
        output_appenders.push("qredux-output-file".to_string());
    }

    let root_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = builder
        .logger(
            Logger::builder()
                .appenders(output_appenders)
                .additive(false)
                .build("qredux-output", LevelFilter::Info),
        )
        .build(Root::builder().appender("diagnostics").build(root_level))
        .map_err(|err| format_err!(err))?;
    log4rs::init_config(config).map_err(|err| format_err!(err))?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), anyhow::Error> {
    configure_logging(cli.output.as_deref(), cli.debug)?;
    log_heading();
    let inp = read_qredux_yaml::<Input, _>(&cli.config).with_context(|| {
        format!("Unable to read the input file `{}`", cli.config.display())
    })?;
    inp.handle()
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:?}");
        process::exit(1);
    }
}
