// THEORY:
// The command line front-end is the selection layer of the editor: it turns
// flags into one `EditRequest`, hands it to a pipeline, and prints the status
// lines that come back. Everything that can go wrong is reported through
// `anyhow` with the library error as its source.
//
// Ctrl-C raises the pipeline's cancel token. Pointillism then stops between two
// circles and the partial canvas is still written.

mod cmd_args;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{Level, info, warn};
use viperion::pipeline::CancelToken;
use viperion::{
    EditRequest, EditorConfig, Effect, EffectPipeline, EffectRequest, Outcome, ParallelPipeline,
};

/// Set up logging options
fn setup_logger(options: &ArgMatches) -> Result<()> {
    let log_level = if options.get_flag("debug") {
        Level::Debug
    } else if options.get_flag("trace") {
        Level::Trace
    } else if options.get_flag("warn") {
        Level::Warn
    } else {
        Level::Info
    };

    simple_logger::init_with_level(log_level).context("could not install the logger")?;
    info!("Log level: {log_level}");
    Ok(())
}

fn edit_request(options: &ArgMatches) -> Result<EditRequest> {
    let effect: Effect = options
        .get_one::<String>("effect")
        .context("no effect given")?
        .parse()?;

    let mut request = EffectRequest::new(effect);
    request.parameter = options.get_one::<i64>("parameter").copied();
    request.seed = options.get_one::<u64>("seed").copied();

    let input = options.get_one::<String>("input").context("no input given")?;
    let output_dir = options
        .get_one::<String>("output-dir")
        .context("no output directory given")?;
    let name = options.get_one::<String>("name").context("no output name given")?;

    Ok(EditRequest::new(input, output_dir, name, request))
}

fn editor_config(options: &ArgMatches) -> EditorConfig {
    let config = EditorConfig::default();
    match options.get_one::<usize>("workers") {
        Some(workers) => config.with_workers(*workers),
        None => config,
    }
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Skipped => println!("Parameter is 0, nothing was written."),
        Outcome::Complete(_) | Outcome::Partial { .. } => {
            for line in outcome.status() {
                println!("{line}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = cmd_args::create_cmd_args().get_matches();
    setup_logger(&options)?;

    let request = edit_request(&options)?;
    info!(
        "{} -> {} ({})",
        request.source.display(),
        request.destination.display(),
        request.effect.effect
    );

    let outcome = if options.get_flag("sequential") {
        let pipeline = EffectPipeline::new();
        spawn_cancel_on_ctrl_c(pipeline.cancel_token());
        tokio::task::spawn_blocking(move || pipeline.edit_file(&request)).await??
    } else {
        let pipeline = ParallelPipeline::new(editor_config(&options));
        spawn_cancel_on_ctrl_c(pipeline.cancel_token());
        pipeline.edit_file(&request).await?
    };

    report(&outcome);
    Ok(())
}

fn spawn_cancel_on_ctrl_c(token: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current step");
            token.cancel();
        }
    });
}
