//! Async host for the flow controller.
//!
//! Executes the commands a transition returns: timers become `tokio` sleeps,
//! insight requests go through the adapter. Completions are fed back as events
//! until nothing is pending.

use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use palm_core::{Command, Event, FlowController, FlowError};

use crate::adapter::InsightAdapter;

fn spawn_command<'a>(adapter: &'a InsightAdapter, command: Command) -> BoxFuture<'a, Event> {
    match command {
        Command::Schedule(timer) => Box::pin(async move {
            tokio::time::sleep(timer.delay).await;
            Event::TimerFired(timer)
        }),
        Command::RequestInsight(request) => Box::pin(async move {
            let result = adapter.generate(&request).await;
            Event::InsightReady {
                generation: request.generation,
                result: Box::new(result),
            }
        }),
    }
}

/// Run `commands` and everything they lead to. `on_update` sees the controller
/// after every applied event.
pub async fn drive<F>(
    controller: &mut FlowController,
    commands: Vec<Command>,
    adapter: &InsightAdapter,
    mut on_update: F,
) -> Result<(), FlowError>
where
    F: FnMut(&FlowController),
{
    let mut pending: FuturesUnordered<BoxFuture<'_, Event>> = commands
        .into_iter()
        .map(|c| spawn_command(adapter, c))
        .collect();

    while let Some(event) = pending.next().await {
        let follow_up = controller.handle(event)?;
        on_update(controller);
        for c in follow_up {
            pending.push(spawn_command(adapter, c));
        }
    }
    Ok(())
}
