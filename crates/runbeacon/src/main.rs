use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use runbeacon::cli::{Cli, Commands};
use runbeacon::context::RunContext;
use runbeacon::logging;
use runbeacon::message::build_message;
use runbeacon::sink::{Sink, StdoutSink, WebhookSink};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let rt = Runtime::new()?;
    rt.block_on(async {
        match cli.command {
            Commands::Send { dry_run } => {
                let ctx = RunContext::from_env().context("Loading run context")?;
                info!(
                    repository = %ctx.repository,
                    workflow = %ctx.workflow,
                    event = %ctx.event_name,
                    action = %ctx.action,
                    status = %ctx.job_status,
                    run_id = %ctx.run_id,
                    "Loaded run context"
                );
                info!("eventPayload: {}", serde_json::to_string_pretty(&ctx.raw_event)?);

                if ctx.toggles.line {
                    debug!("LINE notifications requested but not supported, ignoring");
                }
                if !ctx.toggles.discord && !dry_run {
                    info!("Discord notifications disabled, nothing to send");
                    return Ok(());
                }

                let message = build_message(&ctx);
                info!("payload: {}", serde_json::to_string_pretty(&message.payload)?);

                let sink: Box<dyn Sink> = if dry_run {
                    Box::new(StdoutSink)
                } else {
                    Box::new(WebhookSink::new())
                };

                info!(sink = sink.name(), "Sending message ...");
                match sink.deliver(&message).await {
                    Ok(()) => {
                        eprintln!("{} Message sent", "✔".green());
                    }
                    Err(err) => {
                        eprintln!("{} Delivery failed: {err}", "✘".red());
                        return Err(err).context("Delivering notification");
                    }
                }
            }
            Commands::Version { json } => {
                if json {
                    let info = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "commit": option_env!("GIT_SHA").unwrap_or("unknown"),
                        "build_date": option_env!("BUILD_DATE").unwrap_or("unknown"),
                    });
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    println!(
                        "runbeacon {} (commit: {}, built: {})",
                        env!("CARGO_PKG_VERSION"),
                        option_env!("GIT_SHA").unwrap_or("unknown"),
                        option_env!("BUILD_DATE").unwrap_or("unknown"),
                    );
                }
            }
        }
        Ok(())
    })
}
