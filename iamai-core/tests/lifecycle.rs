//! Lifecycle tests for Bot::run
//!
//! These tests drive the full Initialized -> Running -> ShuttingDown ->
//! Stopped sequence with in-process adapters and plugins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use iamai_core::{
    Adapter, AdapterCatalog, AdapterError, Bot, BotError, BotOptions, BotState, Config, Event,
    MemorySink, Plugin, PluginError,
};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, PartialEq)]
enum StartMode {
    Ok,
    Fail,
    /// Run until stop() is called
    UntilStopped,
    /// Never return, ignoring stop()
    Hang,
}

struct MockAdapter {
    name: String,
    start_mode: StartMode,
    fail_stop: bool,
    hang_stop: bool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    stopped: CancellationToken,
    stop_log: Arc<Mutex<Vec<String>>>,
}

impl MockAdapter {
    fn new(name: &str, start_mode: StartMode, stop_log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            start_mode,
            fail_stop: false,
            hang_stop: false,
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            stopped: CancellationToken::new(),
            stop_log: stop_log.clone(),
        }
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), AdapterError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        match self.start_mode {
            StartMode::Ok => Ok(()),
            StartMode::Fail => Err(AdapterError::start("connection refused")),
            StartMode::UntilStopped => {
                self.stopped.cancelled().await;
                Ok(())
            }
            StartMode::Hang => std::future::pending().await,
        }
    }

    async fn stop(&self) -> Result<(), AdapterError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.stop_log.lock().unwrap().push(self.name.clone());
        self.stopped.cancel();
        if self.hang_stop {
            std::future::pending::<()>().await;
        }
        if self.fail_stop {
            return Err(AdapterError::stop("socket already closed"));
        }
        Ok(())
    }
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl Plugin for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn handle_event(&self, event: &Event) -> Result<(), PluginError> {
        self.seen.lock().unwrap().push(event.name.clone());
        Ok(())
    }
}

fn test_options() -> BotOptions {
    BotOptions {
        listen_for_signals: false,
        drain_timeout: Duration::from_millis(200),
        ..BotOptions::default()
    }
}

fn test_bot(config: Config, options: BotOptions) -> (Arc<Bot>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let bot = Bot::with_options(config, options).with_sink(sink.clone());
    (Arc::new(bot), sink)
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

fn spawn_run(bot: &Arc<Bot>) -> tokio::task::JoinHandle<Result<(), BotError>> {
    let bot = bot.clone();
    tokio::spawn(async move { bot.run().await })
}

#[tokio::test]
async fn start_failure_is_reported_and_every_adapter_is_stopped() {
    let (bot, sink) = test_bot(Config::default(), test_options());
    let log = Arc::new(Mutex::new(Vec::new()));
    let x = Arc::new(MockAdapter::new("X", StartMode::Fail, &log));
    let y = Arc::new(MockAdapter::new("Y", StartMode::Ok, &log));
    bot.add_adapter(x.clone());
    bot.add_adapter(y.clone());

    let run = spawn_run(&bot);
    eventually(|| x.starts.load(Ordering::SeqCst) == 1 && y.starts.load(Ordering::SeqCst) == 1)
        .await;
    assert_eq!(bot.state(), BotState::Running);

    bot.shutdown();
    run.await.unwrap().unwrap();

    let start_errors = sink.matching("Error starting adapter");
    assert_eq!(start_errors.len(), 1);
    assert_eq!(start_errors[0].field("adapter"), Some("X"));
    assert!(start_errors[0].field("error").unwrap().contains("connection refused"));

    assert_eq!(x.stops.load(Ordering::SeqCst), 1);
    assert_eq!(y.stops.load(Ordering::SeqCst), 1);
    assert_eq!(bot.state(), BotState::Stopped);
}

#[tokio::test]
async fn stop_failure_does_not_skip_later_adapters() {
    let (bot, sink) = test_bot(Config::default(), test_options());
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut a = MockAdapter::new("a", StartMode::Ok, &log);
    a.fail_stop = true;
    let a = Arc::new(a);
    let b = Arc::new(MockAdapter::new("b", StartMode::Ok, &log));
    let c = Arc::new(MockAdapter::new("c", StartMode::Ok, &log));
    bot.add_adapter(a.clone());
    bot.add_adapter(b.clone());
    bot.add_adapter(c.clone());

    bot.shutdown();
    bot.run().await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    for adapter in [&a, &b, &c] {
        assert_eq!(adapter.stops.load(Ordering::SeqCst), 1);
    }

    let stop_errors = sink.matching("Error stopping adapter");
    assert_eq!(stop_errors.len(), 1);
    assert_eq!(stop_errors[0].field("adapter"), Some("a"));
}

#[tokio::test]
async fn shutdown_is_observed_promptly() {
    let (bot, _) = test_bot(Config::default(), test_options());
    let log = Arc::new(Mutex::new(Vec::new()));
    for i in 0..8 {
        bot.add_adapter(Arc::new(MockAdapter::new(
            &format!("adapter-{i}"),
            StartMode::UntilStopped,
            &log,
        )));
    }

    let run = spawn_run(&bot);
    bot.subscribe_state()
        .wait_for(|state| *state == BotState::Running)
        .await
        .unwrap();

    bot.shutdown();
    tokio::time::timeout(Duration::from_millis(500), run)
        .await
        .expect("run did not return promptly")
        .unwrap()
        .unwrap();

    assert_eq!(log.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn shutdown_may_be_requested_repeatedly() {
    let (bot, _) = test_bot(Config::default(), test_options());
    let run = spawn_run(&bot);

    bot.shutdown();
    bot.shutdown();
    bot.shutdown_token().cancel();

    run.await.unwrap().unwrap();
    assert_eq!(bot.state(), BotState::Stopped);
}

#[tokio::test]
async fn second_run_is_rejected() {
    let (bot, _) = test_bot(Config::default(), test_options());
    bot.shutdown();
    bot.run().await.unwrap();

    let err = bot.run().await.unwrap_err();
    assert!(matches!(err, BotError::AlreadyRunning));
    assert_eq!(bot.state(), BotState::Stopped);
}

#[tokio::test]
async fn stop_timeout_bounds_a_hung_adapter() {
    let options = BotOptions {
        stop_timeout: Some(Duration::from_millis(50)),
        ..test_options()
    };
    let (bot, sink) = test_bot(Config::default(), options);
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut hung = MockAdapter::new("hung", StartMode::Ok, &log);
    hung.hang_stop = true;
    let after = Arc::new(MockAdapter::new("after", StartMode::Ok, &log));
    bot.add_adapter(Arc::new(hung));
    bot.add_adapter(after.clone());

    bot.shutdown();
    tokio::time::timeout(Duration::from_secs(1), bot.run())
        .await
        .expect("hung stop stalled shutdown")
        .unwrap();

    let stop_errors = sink.matching("Error stopping adapter");
    assert_eq!(stop_errors.len(), 1);
    assert!(stop_errors[0].field("error").unwrap().contains("timed out"));
    assert_eq!(after.stops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn start_tasks_ignoring_stop_are_aborted() {
    let (bot, sink) = test_bot(Config::default(), test_options());
    let log = Arc::new(Mutex::new(Vec::new()));
    let stubborn = Arc::new(MockAdapter::new("stubborn", StartMode::Hang, &log));
    let polite = Arc::new(MockAdapter::new("polite", StartMode::UntilStopped, &log));
    bot.add_adapter(stubborn.clone());
    bot.add_adapter(polite.clone());

    let run = spawn_run(&bot);
    eventually(|| stubborn.starts.load(Ordering::SeqCst) == 1).await;
    bot.shutdown();
    run.await.unwrap().unwrap();

    let warnings = sink.matching("Adapter still running after stop, aborting");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field("adapter"), Some("stubborn"));
}

#[tokio::test]
async fn queued_events_are_dispatched_by_run_loop() {
    let (bot, _) = test_bot(Config::default(), test_options());
    let recorder = Arc::new(Recorder::default());
    bot.add_plugin(recorder.clone());

    let sender = bot.event_sender();
    sender.send(Event::new("before-run")).await.unwrap();

    let run = spawn_run(&bot);
    sender.send(Event::new("during-run")).await.unwrap();
    eventually(|| recorder.seen.lock().unwrap().len() == 2).await;

    bot.shutdown();
    run.await.unwrap().unwrap();

    assert_eq!(*recorder.seen.lock().unwrap(), vec!["before-run", "during-run"]);
    assert!(sender.send(Event::new("after-stop")).await.is_err());
}

struct Greeter {
    ctx_events: iamai_core::EventSender,
    shutdown: CancellationToken,
}

#[async_trait]
impl Adapter for Greeter {
    fn name(&self) -> &str {
        "greeter"
    }

    async fn start(&self) -> Result<(), AdapterError> {
        self.ctx_events
            .send(Event::new("connected"))
            .await
            .map_err(|e| AdapterError::Connection(e.to_string()))?;
        self.shutdown.cancelled().await;
        Ok(())
    }

    async fn stop(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

#[tokio::test]
async fn configured_adapters_are_built_from_catalog() {
    let mut config = Config::default();
    config.bot.adapters = vec!["greeter".to_string()];
    let (bot, sink) = test_bot(config, test_options());
    let recorder = Arc::new(Recorder::default());
    bot.add_plugin(recorder.clone());

    let catalog = AdapterCatalog::new().with("greeter", |ctx| {
        Ok(Arc::new(Greeter {
            ctx_events: ctx.events.clone(),
            shutdown: ctx.shutdown.clone(),
        }) as Arc<dyn Adapter>)
    });
    assert_eq!(bot.install_adapters(&catalog).unwrap(), 1);
    assert_eq!(bot.adapter_names(), vec!["greeter"]);

    let run = spawn_run(&bot);
    eventually(|| recorder.seen.lock().unwrap().as_slice() == ["connected"]).await;

    bot.shutdown();
    run.await.unwrap().unwrap();

    // The adapter returned from start() on its own, so nothing was aborted
    assert!(sink.matching("Adapter still running after stop, aborting").is_empty());
}

#[tokio::test]
async fn state_banner_reports_counts() {
    let mut config = Config::default();
    config.log.level = "warning".to_string();
    let (bot, sink) = test_bot(config, test_options());
    let log = Arc::new(Mutex::new(Vec::new()));
    bot.add_adapter(Arc::new(MockAdapter::new("x", StartMode::Ok, &log)));
    bot.add_plugin(Arc::new(Recorder::default()));

    bot.shutdown();
    bot.run().await.unwrap();

    let banner = sink.matching("Bot is running");
    assert_eq!(banner.len(), 1);
    assert_eq!(banner[0].field("log_level"), Some("warning"));
    assert_eq!(banner[0].field("adapters"), Some("1"));
    assert_eq!(banner[0].field("plugins"), Some("1"));
}
