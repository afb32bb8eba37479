//! Queue subcommand: manage the bounded active work queue.

use clap::Subcommand;

use crate::common::{build_remote, load_config, load_queue, CliResult};

#[derive(Subcommand)]
pub enum QueueAction {
    /// Replace the queue with the given item ids, in rank order (max 5)
    Set {
        /// Item ids, highest rank first
        ids: Vec<String>,
    },
    /// Show the queued items and the active slot
    Show,
}

pub fn run(action: QueueAction) -> CliResult {
    match action {
        QueueAction::Set { ids } => set(ids),
        QueueAction::Show => show(),
    }
}

fn set(ids: Vec<String>) -> CliResult {
    let config = load_config()?;
    if ids.len() > config.queue.capacity {
        return Err(format!(
            "queue holds at most {} items ({} given)",
            config.queue.capacity,
            ids.len()
        )
        .into());
    }

    let remote = build_remote(&config)?;
    let mut items = Vec::with_capacity(ids.len());
    for id in &ids {
        items.push(remote.fetch_item(id)?);
    }

    let mut queue = load_queue(&config)?;
    queue.set_items(items);
    queue.persist()?;

    println!("queued {} item(s)", queue.len());
    Ok(())
}

fn show() -> CliResult {
    let config = load_config()?;
    let queue = load_queue(&config)?;
    if queue.is_empty() {
        println!("queue is empty");
        return Ok(());
    }
    for (i, item) in queue.items().iter().enumerate() {
        let marker = if i == queue.active_index() { ">" } else { " " };
        println!(
            "{marker} {}. {} [{}] {:?}",
            i + 1,
            item.title,
            item.id,
            item.timer_state
        );
    }
    Ok(())
}
