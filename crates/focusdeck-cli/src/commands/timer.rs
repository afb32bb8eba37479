//! Timer subcommand: drive the session timer for the active queue item.
//!
//! Each invocation rebuilds the engine, reconciles the timer cache-first,
//! applies one transition, and persists the queue before exit. `watch`
//! keeps a process alive with the display tick and the periodic remote
//! backup.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use clap::Subcommand;
use focusdeck_core::{now_ms, spawn_backup, Event, FollowUp, TimerState};

use crate::common::{build_engine, fmt_elapsed, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume a session on the active item
    Start,
    /// Pause the running session
    Pause,
    /// Show the active item and elapsed time
    Status,
    /// Complete the active item and advance the queue
    Finish,
    /// Hand the active item off to a person or agent and advance
    Handoff {
        /// Roster target id
        target: String,
    },
    /// Defer the active item to a follow-up date and advance
    Defer {
        /// Days from today (1, 3, or 7)
        #[arg(long, conflicts_with = "date")]
        days: Option<u32>,
        /// Explicit date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Discard all sessions on the active item
    Reset,
    /// Run the live display loop with periodic remote backup
    Watch,
}

pub fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Start => transition(|e| e.start()),
        TimerAction::Pause => transition(|e| e.pause()),
        TimerAction::Status => status(),
        TimerAction::Finish => transition(|e| e.finish()),
        TimerAction::Handoff { target } => transition(move |e| e.hand_off(&target)),
        TimerAction::Defer { days, date } => {
            let follow_up = parse_follow_up(days, date)?;
            transition(move |e| e.defer(follow_up))
        }
        TimerAction::Reset => transition(|e| e.reset()),
        TimerAction::Watch => watch(),
    }
}

fn parse_follow_up(
    days: Option<u32>,
    date: Option<String>,
) -> Result<FollowUp, Box<dyn std::error::Error>> {
    match (days, date) {
        (Some(d), None) => Ok(FollowUp::InDays(d)),
        (None, Some(s)) => Ok(FollowUp::On(NaiveDate::parse_from_str(&s, "%Y-%m-%d")?)),
        _ => Err("pass exactly one of --days or --date".into()),
    }
}

/// Activate the queue head if there is one. An empty queue is not an
/// error for read-only commands; it reports as `false`.
fn activate_if_present(
    engine: &mut focusdeck_core::FocusEngine,
) -> Result<bool, focusdeck_core::EngineError> {
    match engine.activate() {
        Ok(_) => Ok(true),
        Err(focusdeck_core::EngineError::QueueEmpty) => Ok(false),
        Err(e) => Err(e),
    }
}

fn transition(
    apply: impl FnOnce(&mut focusdeck_core::FocusEngine) -> Result<Event, focusdeck_core::EngineError>,
) -> CliResult {
    let mut engine = build_engine()?;
    if let Err(e) = engine.refresh_active_from_remote() {
        eprintln!("warning: could not refresh item from remote: {e}");
    }
    engine.activate()?;
    let event = apply(&mut engine)?;
    engine.queue().persist()?;
    print_event(&event);
    Ok(())
}

fn status() -> CliResult {
    let mut engine = build_engine()?;
    if !activate_if_present(&mut engine)? {
        println!("queue is empty");
        return Ok(());
    }
    if let Some(Event::StateSnapshot {
        item_id,
        state,
        session_counter,
        elapsed_ms,
        ..
    }) = engine.tick(now_ms())
    {
        let title = engine
            .queue()
            .active()
            .map(|i| i.title.clone())
            .unwrap_or_default();
        println!(
            "{title} [{item_id}] {state:?} session {session_counter} elapsed {}",
            fmt_elapsed(elapsed_ms)
        );
    }
    Ok(())
}

fn watch() -> CliResult {
    let mut engine = build_engine()?;
    if !activate_if_present(&mut engine)? {
        println!("queue is empty");
        return Ok(());
    }
    let tick_interval = {
        let config = crate::common::load_config()?;
        Duration::from_millis(config.timer.tick_interval_ms)
    };

    let engine = Arc::new(Mutex::new(engine));
    let backup = spawn_backup(Arc::clone(&engine), Duration::from_secs(1));

    loop {
        std::thread::sleep(tick_interval);
        let engine = engine.lock().map_err(|_| "engine lock poisoned")?;
        let Some(Event::StateSnapshot {
            state,
            session_counter,
            elapsed_ms,
            ..
        }) = engine.tick(now_ms())
        else {
            println!("\nqueue is empty");
            break;
        };
        print!(
            "\r{:?} session {session_counter} elapsed {}   ",
            state,
            fmt_elapsed(elapsed_ms)
        );
        use std::io::Write;
        let _ = std::io::stdout().flush();
        if state == TimerState::Stopped {
            // Another process finished or reset the item; nothing to watch.
            println!();
            break;
        }
    }

    backup.stop();
    Ok(())
}

fn print_event(event: &Event) {
    match event {
        Event::SessionStarted { session_num, .. } => {
            println!("session {session_num} started");
        }
        Event::SessionPaused {
            session_num,
            duration_ms,
            ..
        } => {
            println!("session {session_num} paused at {}", fmt_elapsed(*duration_ms));
        }
        Event::ItemFinished {
            item_id,
            total_session_count,
            total_time_spent_ms,
            ..
        } => {
            println!(
                "finished {item_id}: {total_session_count} session(s), {}",
                fmt_elapsed(*total_time_spent_ms)
            );
        }
        Event::ItemHandedOff {
            item_id,
            target_id,
            to_agent,
            ..
        } => {
            let kind = if *to_agent { "agent" } else { "teammate" };
            println!("handed {item_id} off to {kind} {target_id}");
        }
        Event::ItemDeferred {
            item_id, due_date, ..
        } => {
            println!("deferred {item_id} until {due_date}");
        }
        Event::TimerReset { item_id, .. } => {
            println!("reset timer on {item_id}");
        }
        other => {
            println!("{}", serde_json::to_string(other).unwrap_or_default());
        }
    }
}
