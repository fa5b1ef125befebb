use clap::Parser;
use docboard::cli::Args;
use docboard::context::{AppContext, StandardContext};
use docboard::controller::{Controller, RunOutcome};
use docboard::host::{Host, PresetHost, TerminalHost};
use docboard::report;
use docboard::submitter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::process::ExitCode;

const EXIT_FATAL: u8 = 2;

fn init_logging(ctx: &dyn AppContext, verbose: bool) {
    let term_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("docboard")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = ctx.get_log_file_path() {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
            Err(e) => eprintln!("Cannot open log file '{}': {}", path.display(), e),
        }
    }
    let _ = CombinedLogger::init(loggers);
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let ctx = StandardContext::new(args.root.clone());
    init_logging(&ctx, args.verbose);

    let mut terminal_host;
    let mut preset_host;
    let host: &mut dyn Host = if args.non_interactive {
        preset_host = PresetHost::default();
        &mut preset_host
    } else {
        terminal_host = TerminalHost::stdio();
        &mut terminal_host
    };

    let request = args.to_request();
    let mut controller = Controller::new(&ctx, host).with_interrupts(submitter::ctrl_c);
    match controller.run(&request).await {
        Ok(outcome) => {
            match &outcome {
                RunOutcome::TemplateGenerated(path) => {
                    println!("Sample template written to {}", path.display());
                    println!("Fill it in and run docboard again with --file.");
                }
                RunOutcome::NoCards(path) => {
                    println!("No cards found in {}.", path.display());
                }
                RunOutcome::DryRun(cards) => print!("{}", report::format_preview(cards)),
                RunOutcome::Submitted(run) => print!("{}", report::format_summary(run)),
            }
            ExitCode::from(outcome.exit_code() as u8)
        }
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
