#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use soli::di::{Action, Container, HandlerDefinition};
use soli::dispatcher::{DispatchState, Forward};
use soli::events::{Event, EventsManager, Verdict};

/// Shared record of fired event names.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn names(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|n| *n == name).count()
    }

    /// Listener recording every event it hears, never stopping.
    pub fn listener(&self) -> impl Fn(&Event<'_>, &mut DispatchState) -> Verdict + Send + Sync {
        let log = Arc::clone(&self.0);
        move |event: &Event<'_>, _state: &mut DispatchState| {
            log.lock().unwrap().push(event.name().to_string());
            Verdict::Continue
        }
    }
}

/// Events manager that records every `dispatch:*` event into `log`.
pub fn recording_events(log: &EventLog) -> EventsManager<DispatchState> {
    let mut events: EventsManager<DispatchState> = EventsManager::new();
    events.attach("dispatch", log.listener());
    events
}

/// Counts action invocations across every handler in [`test_container`].
#[derive(Clone, Default)]
pub struct Invocations(Arc<AtomicUsize>);

impl Invocations {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Container with:
/// - `IndexController::indexAction` returning `"index"`
/// - `IndexController::echoAction` returning its params
/// - `HopController::{aAction, bAction}` (`a` forwards to `b`)
/// - `LoopController::pingAction` forwarding to itself forever
/// - `FailController::boomAction` returning an error
pub fn test_container(invocations: &Invocations) -> Container {
    let mut container = Container::new();

    let count = invocations.clone();
    let count_echo = invocations.clone();
    container.register(
        HandlerDefinition::new("IndexController", |_| ())
            .action("indexAction", move |_: &mut (), _: &mut Action<'_>| {
                count.bump();
                Ok(json!("index"))
            })
            .action("echoAction", move |_: &mut (), action: &mut Action<'_>| {
                count_echo.bump();
                Ok(action.params().clone())
            }),
    );

    let count_a = invocations.clone();
    let count_b = invocations.clone();
    container.register(
        HandlerDefinition::new("HopController", |_| ())
            .action("aAction", move |_: &mut (), action: &mut Action<'_>| {
                count_a.bump();
                action.forward(Forward::to_action("b"));
                Ok(json!("a"))
            })
            .action("bAction", move |_: &mut (), _: &mut Action<'_>| {
                count_b.bump();
                Ok(json!("b"))
            }),
    );

    let count_ping = invocations.clone();
    container.register(
        HandlerDefinition::new("LoopController", |_| ()).action(
            "pingAction",
            move |_: &mut (), action: &mut Action<'_>| {
                count_ping.bump();
                action.forward(Forward::to_action("ping"));
                Ok(Value::Null)
            },
        ),
    );

    let count_fail = invocations.clone();
    container.register(
        HandlerDefinition::new("FailController", |_| ()).action(
            "boomAction",
            move |_: &mut (), _: &mut Action<'_>| {
                count_fail.bump();
                Err(anyhow::anyhow!("boom"))
            },
        ),
    );

    container
}

/// In-memory writer for capturing formatted log output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Install a JSON subscriber for the current thread that writes into the returned buffer.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
