//! Event loop for one attempt.
//!
//! Everything runs on the caller's task except the ticker and the submission
//! sequence, whose results are folded back into [`App`] here.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures_util::StreamExt;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::app::{Action, App};
use crate::engine::{
    submission, AttemptRequest, AttemptSession, AttemptStatus, SubmissionReport,
    SubmissionRequest, Ticker, TICK_PERIOD,
};
use crate::gateway::Gateway;
use crate::models::ScoreBands;
use crate::terminal::{self, AttemptTerminal};
use crate::{ui, AppError};

const REDRAW_PERIOD: Duration = Duration::from_millis(250);

type PendingSubmission = Option<JoinHandle<SubmissionReport>>;

/// Runs an attempt in the terminal until the user quits.
pub async fn run_attempt(
    gateway: Arc<dyn Gateway>,
    request: AttemptRequest,
    bands: ScoreBands,
) -> Result<(), AppError> {
    let mut app = App::new(AttemptSession::new(request), bands);
    let mut term = terminal::init()?;
    let result = event_loop(&mut term, &mut app, gateway).await;
    terminal::restore()?;
    result
}

async fn event_loop(
    term: &mut AttemptTerminal,
    app: &mut App,
    gateway: Arc<dyn Gateway>,
) -> Result<(), AppError> {
    let mut events = EventStream::new();

    term.draw(|frame| ui::render(frame, app))?;
    tokio::select! {
        _ = app.start(gateway.as_ref()) => {}
        quit = wait_for_quit(&mut events) => {
            quit?;
            tracing::info!("left while the test was loading");
            return Ok(());
        }
    }

    let mut ticker = Ticker::spawn(TICK_PERIOD);
    let mut redraw = time::interval(REDRAW_PERIOD);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut pending: PendingSubmission = None;
    if let Action::Submit(request) = app.poll_expiry() {
        pending = Some(spawn_submission(&gateway, request));
    }

    loop {
        if app.status() != AttemptStatus::InProgress {
            ticker.cancel();
        }
        term.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event else {
                    break;
                };
                let Some(key) = pressed_key(event?) else {
                    continue;
                };
                match app.handle_key(key) {
                    Action::Quit => break,
                    Action::Submit(request) => pending = Some(spawn_submission(&gateway, request)),
                    Action::None => {}
                }
            }
            Some(()) = ticker.next(), if !ticker.is_cancelled() => {
                if let Action::Submit(request) = app.on_tick() {
                    pending = Some(spawn_submission(&gateway, request));
                }
            }
            joined = join_pending(&mut pending), if pending.is_some() => {
                pending = None;
                match joined {
                    Ok(report) => app.on_submission(report),
                    Err(err) => app.on_submission_lost(&err.to_string()),
                }
            }
            _ = redraw.tick() => {
                app.dismiss_expired_notification(Instant::now());
            }
        }
    }

    ticker.cancel();
    if let Some(handle) = pending.take() {
        tracing::warn!("leaving with a submission still in flight");
        handle.abort();
    }
    Ok(())
}

fn spawn_submission(
    gateway: &Arc<dyn Gateway>,
    request: SubmissionRequest,
) -> JoinHandle<SubmissionReport> {
    let gateway = Arc::clone(gateway);
    tokio::spawn(async move { submission::run(gateway.as_ref(), request).await })
}

async fn join_pending(pending: &mut PendingSubmission) -> Result<SubmissionReport, JoinError> {
    match pending.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn wait_for_quit(events: &mut EventStream) -> io::Result<()> {
    while let Some(event) = events.next().await {
        if let Some(KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) = pressed_key(event?) {
            return Ok(());
        }
    }
    Ok(())
}

fn pressed_key(event: Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key.code),
        _ => None,
    }
}
