// Handler registry for the sample application

use std::sync::Arc;

use tracing::debug;

use crate::controllers::{self, UserService};
use crate::di::Container;
use crate::dispatcher::{DispatchErrorKind, DispatchState, Forward};
use crate::events::{Event, EventsManager, Verdict, BEFORE_EXCEPTION};
use crate::tasks;

/// Register every sample controller and task, plus the services they use.
pub fn register_all(container: &mut Container) {
    if !container.has(controllers::user::USER_SERVICE) {
        container.set_service(controllers::user::USER_SERVICE, UserService::default());
    }

    container.register(controllers::index::definition());
    container.register(controllers::user::definition());
    container.register(controllers::error::definition());
    container.register(tasks::main_task::definition());
}

/// `dispatch:beforeException` listener forwarding missing handlers/actions to `error/show`.
pub fn forward_not_found(event: &Event<'_>, state: &mut DispatchState) -> Verdict {
    let Some(err) = event.exception() else {
        return Verdict::Continue;
    };
    match err.kind() {
        DispatchErrorKind::HandlerNotFound | DispatchErrorKind::ActionNotFound => {
            debug!(error = %err, "Forwarding to error/show");
            state.forward(
                Forward::to("error", "show")
                    .with_params(serde_json::json!([err.message()])),
            );
            Verdict::Stop
        }
        _ => Verdict::Continue,
    }
}

/// Dispatch listeners the demo binary runs with.
#[must_use]
pub fn dispatch_events() -> Arc<EventsManager<DispatchState>> {
    let mut events: EventsManager<DispatchState> = EventsManager::new();
    events.attach(BEFORE_EXCEPTION, forward_not_found);
    Arc::new(events)
}
