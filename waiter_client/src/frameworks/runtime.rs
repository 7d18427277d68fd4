// Framework bootstrap for the waiter client runtime.

use crate::domain::{DecisionSink, PushChannel};
use crate::frameworks::cli::{
    self, CliCommand, HELP, ParseError, parse_command, render_notification, render_snapshot,
};
use crate::frameworks::config;
use crate::interface_adapters::clients::dispatch::DispatchClient;
use crate::interface_adapters::notifier::ChannelNotifier;
use crate::interface_adapters::ws_channel::{WsChannelSettings, WsPushChannel, staff_endpoint};
use crate::use_cases::{
    AssignmentController, AssignmentSnapshot, SessionChannels, SessionSettings, forward_decisions,
    run_session,
};

use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Notify, mpsc, watch};
use url::Url;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so they never interleave with the prompt on stdout.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run_with_config() -> io::Result<()> {
    init_runtime();

    let staff_id = config::staff_id().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "WAITER_STAFF_ID must be set")
    })?;

    let ws_url = config::dispatch_ws_url();
    let ws_base = Url::parse(&ws_url).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid DISPATCH_WS_URL `{ws_url}`: {e}"),
        )
    })?;
    let channel = WsPushChannel::spawn(WsChannelSettings {
        url: staff_endpoint(&ws_base, &staff_id),
        initial_backoff: config::reconnect_initial_backoff(),
        max_backoff: config::reconnect_max_backoff(),
        event_capacity: config::EVENT_CHANNEL_CAPACITY,
    });

    let http_url = config::dispatch_http_url();
    let http_timeout = config::http_request_timeout();
    let client = DispatchClient::new(http_url.clone(), staff_id.clone(), http_timeout)
        .map_err(|e| io::Error::other(format!("failed to initialize dispatch client: {e}")))?;
    tracing::info!(
        %staff_id,
        %ws_url,
        %http_url,
        http_timeout_ms = http_timeout.as_millis(),
        "waiter client configured"
    );

    let settings = SessionSettings {
        timeout_grace: config::timeout_grace(),
    };
    let stdin = BufReader::new(tokio::io::stdin());
    run(
        Arc::new(channel),
        Arc::new(client),
        stdin,
        tokio::io::stdout(),
        settings,
    )
    .await
}

/// Runs one waiter session against the given channel and decision sink,
/// reading commands from `input` and writing notifications to `output`.
///
/// Returns once input reaches EOF, the user quits, or the session ends.
/// Commands typed before exit are still applied and reported.
pub async fn run<C, D, R, W>(
    channel: Arc<C>,
    sink: Arc<D>,
    input: R,
    mut output: W,
    settings: SessionSettings,
) -> io::Result<()>
where
    C: PushChannel + 'static,
    D: DecisionSink + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (command_tx, command_rx) = mpsc::channel(config::COMMAND_CHANNEL_CAPACITY);
    let (decision_tx, decision_rx) = mpsc::channel(config::DECISION_CHANNEL_CAPACITY);
    let (notification_tx, mut notification_rx) =
        mpsc::channel(config::NOTIFICATION_CHANNEL_CAPACITY);
    let (snapshot_tx, snapshot_rx) = watch::channel(AssignmentSnapshot::default());
    let shutdown = Arc::new(Notify::new());

    let controller = AssignmentController::new(ChannelNotifier::new(notification_tx));
    let session = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            run_session(
                channel.as_ref(),
                controller,
                SessionChannels {
                    commands: command_rx,
                    decisions: decision_tx,
                    snapshots: snapshot_tx,
                },
                settings,
                shutdown,
            )
            .await;
        }
    });
    let forwarder = tokio::spawn(forward_decisions(sink, decision_rx));

    write_line(&mut output, HELP).await?;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            notification = notification_rx.recv() => {
                // The controller owns the sender; None means the session is gone.
                let Some(notification) = notification else { break };
                write_line(&mut output, &render_notification(&notification)).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(CliCommand::Quit) => break,
                    Ok(CliCommand::Help) => write_line(&mut output, HELP).await?,
                    Ok(CliCommand::List) => {
                        let rendered = render_snapshot(&snapshot_rx.borrow());
                        write_line(&mut output, &rendered).await?;
                    }
                    Ok(command) => {
                        let user_command = cli::to_user_command(command, &snapshot_rx.borrow());
                        match user_command {
                            Some(user_command) => {
                                if command_tx.send(user_command).await.is_err() {
                                    break;
                                }
                            }
                            None => write_line(&mut output, "no active assignment").await?,
                        }
                    }
                    Err(ParseError::Empty) => {}
                    Err(error) => write_line(&mut output, &error.to_string()).await?,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received");
                shutdown.notify_one();
                break;
            }
        }
    }

    // Closing the command channel lets the session drain what was already typed.
    drop(command_tx);
    if let Err(error) = session.await {
        tracing::error!(%error, "assignment session task failed");
    }
    if let Err(error) = forwarder.await {
        tracing::error!(%error, "decision forwarder task failed");
    }
    output.flush().await
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
