use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::WizardConfig;
use crate::navigation::{update_query_step, HistoryListener, Location, UrlBridge};

use super::registry::{Screen, StepRegistry};
use super::services::WizardServices;
use super::transitions::{self, Effect, Transition};
use super::types::{InvocationId, Service, Step, TimerId, WizardContext, WizardEvent};

/// Audit record of one taken transition
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord {
    pub from: Step,
    pub to: Step,
    pub event: &'static str,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Cloneable handle screens and the host page use to feed events to the wizard
#[derive(Debug, Clone)]
pub struct WizardEventSender {
    tx: mpsc::UnboundedSender<WizardEvent>,
}

impl WizardEventSender {
    /// Queue an event. Returns false if the controller is gone.
    pub fn send(&self, event: WizardEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

impl HistoryListener for WizardEventSender {
    fn on_history_change(&self) -> bool {
        self.send(WizardEvent::ExternalUrlUpdate)
    }
}

#[derive(Debug)]
struct Running {
    id: u64,
    task: JoinHandle<()>,
}

/// Drives the customize-store wizard.
///
/// Events are processed one at a time, in queue order. Services and the delayed transition
/// run as tokio tasks whose only way back in is the event queue, so `start` and `dispatch`
/// must be called from within a tokio runtime.
pub struct WizardController {
    registry: StepRegistry,
    services: Arc<dyn WizardServices>,
    location: Arc<dyn Location>,
    site_preview_delay: Duration,
    step: Step,
    context: WizardContext,
    screen: Option<Screen>,
    events_tx: mpsc::UnboundedSender<WizardEvent>,
    events_rx: mpsc::UnboundedReceiver<WizardEvent>,
    invocations: HashMap<Service, Running>,
    timer: Option<Running>,
    next_id: u64,
    bridge: Option<UrlBridge>,
    history: Vec<TransitionRecord>,
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("step", &self.step)
            .field("context", &self.context)
            .field("screen", &self.screen)
            .field("invocations", &self.invocations.keys().collect::<Vec<_>>())
            .field("timer_armed", &self.timer.is_some())
            .field("bridge_attached", &self.bridge.is_some())
            .finish()
    }
}

impl WizardController {
    pub fn new(
        settings: &WizardConfig,
        services: Arc<dyn WizardServices>,
        location: Arc<dyn Location>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            registry: StepRegistry,
            services,
            location,
            site_preview_delay: settings.site_preview_delay(),
            step: Step::Navigate,
            context: WizardContext::default(),
            screen: None,
            events_tx,
            events_rx,
            invocations: HashMap::new(),
            timer: None,
            next_id: 0,
            bridge: None,
            history: Vec::new(),
        }
    }

    /// Subscribe to history changes and resolve the first step from the location
    pub fn start(&mut self) {
        if self.bridge.is_some() {
            return;
        }
        self.bridge = Some(UrlBridge::attach(self.location.clone(), self.sender()));

        let started = Instant::now();
        let initial = transitions::initial(&self.context, &self.location.query());
        self.apply("INIT", initial, started);
    }

    /// Stop listening to history and drop pending work
    pub fn stop(&mut self) {
        self.bridge = None;
        self.cancel_timer();
        for (_, running) in self.invocations.drain() {
            running.task.abort();
        }
    }

    pub fn sender(&self) -> WizardEventSender {
        WizardEventSender {
            tx: self.events_tx.clone(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    /// Screen to render: the current step's, or the last one shown while the step has none
    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    pub fn css_class(&self) -> String {
        self.registry.css_class(self.step)
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    pub fn location(&self) -> &Arc<dyn Location> {
        &self.location
    }

    pub fn is_finished(&self) -> bool {
        self.step.is_terminal()
    }

    /// Run one event through the transition table. Returns whether a transition was taken.
    pub fn dispatch(&mut self, event: WizardEvent) -> bool {
        let started = Instant::now();

        if self.is_stale(&event) {
            debug!(step = %self.step, event = event.name(), "Dropping stale completion");
            return false;
        }

        let query = self.location.query();
        match transitions::transition(self.step, &event, &self.context, &query) {
            Some(transition) => {
                self.apply(event.name(), transition, started);
                true
            }
            None => {
                debug!(step = %self.step, event = event.name(), "Event not handled in current step");
                false
            }
        }
    }

    /// Wait for the next queued event and dispatch it
    pub async fn process_next(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => self.dispatch(event),
            // Unreachable while we hold a sender
            None => false,
        }
    }

    /// Dispatch everything already queued. Returns how many events caused a transition.
    pub fn process_pending(&mut self) -> usize {
        let mut taken = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.dispatch(event) {
                taken += 1;
            }
        }
        taken
    }

    /// Process events until `done` holds for the current step
    pub async fn run_until<F>(&mut self, done: F)
    where
        F: Fn(Step) -> bool,
    {
        while !done(self.step) {
            self.process_next().await;
        }
    }

    /// Process events while the current step is waiting on a service or the timer
    pub async fn settle(&mut self) {
        self.run_until(|step| !step.is_awaiting()).await;
    }

    /// Process events until the wizard hands control back to the host
    pub async fn run(&mut self) {
        self.run_until(|step| step.is_terminal()).await;
        info!(step = %self.step, "Customize store wizard finished");
    }

    fn is_stale(&self, event: &WizardEvent) -> bool {
        let running = |service: Service, invocation: &InvocationId| {
            self.invocations
                .get(&service)
                .is_some_and(|running| running.id == invocation.0)
        };

        match event {
            WizardEvent::ThemeCardsFetched { invocation, .. }
            | WizardEvent::ThemeCardsFetchFailed { invocation, .. } => {
                !running(Service::FetchThemeCards, invocation)
            }
            WizardEvent::TaskCompleted { invocation }
            | WizardEvent::TaskCompletionFailed { invocation, .. } => {
                !running(Service::MarkTaskComplete, invocation)
            }
            WizardEvent::SitePreviewDelayElapsed { timer } => {
                self.timer.as_ref().map(|armed| armed.id) != Some(timer.0)
            }
            _ => false,
        }
    }

    fn apply(&mut self, event: &'static str, transition: Transition, started: Instant) {
        let Transition {
            target,
            context,
            effects,
        } = transition;

        for effect in effects {
            self.run_effect(effect);
        }

        let from = self.step;
        self.step = target;
        self.context = context;
        if let Some(screen) = self.registry.screen(target) {
            self.screen = Some(screen);
        }

        let record = TransitionRecord {
            from,
            to: target,
            event,
            timestamp: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            from = %record.from,
            to = %record.to,
            event = record.event,
            duration_ms = record.duration_ms,
            "Customize store transition"
        );

        self.history.push(record);
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::UpdateQueryStep(slug) => {
                update_query_step(self.location.as_ref(), slug);
            }
            Effect::Invoke(service) => self.invoke(service),
            Effect::CancelInvocation(service) => {
                if let Some(running) = self.invocations.remove(&service) {
                    running.task.abort();
                }
            }
            Effect::PrefetchSitePreview => {
                let services = self.services.clone();
                tokio::spawn(async move {
                    if let Err(e) = services.prefetch_site_preview().await {
                        warn!(error = %e, "Site preview prefetch failed");
                    }
                });
            }
            Effect::ArmSitePreviewTimer => self.arm_timer(),
            Effect::CancelSitePreviewTimer => self.cancel_timer(),
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn invoke(&mut self, service: Service) {
        let id = self.next_id();
        let invocation = InvocationId(id);
        let services = self.services.clone();
        let tx = self.events_tx.clone();

        debug!(?service, invocation = id, "Invoking service");

        let task = tokio::spawn(async move {
            let event = match service {
                Service::FetchThemeCards => match services.fetch_theme_cards().await {
                    Ok(theme_cards) => WizardEvent::ThemeCardsFetched {
                        invocation,
                        theme_cards,
                    },
                    Err(e) => {
                        warn!(error = %e, "Fetching theme cards failed");
                        WizardEvent::ThemeCardsFetchFailed {
                            invocation,
                            reason: e.to_string(),
                        }
                    }
                },
                Service::MarkTaskComplete => match services.mark_task_complete().await {
                    Ok(()) => WizardEvent::TaskCompleted { invocation },
                    Err(e) => {
                        warn!(error = %e, "Marking the task complete failed");
                        WizardEvent::TaskCompletionFailed {
                            invocation,
                            reason: e.to_string(),
                        }
                    }
                },
            };
            let _ = tx.send(event);
        });

        if let Some(previous) = self.invocations.insert(service, Running { id, task }) {
            previous.task.abort();
        }
    }

    fn arm_timer(&mut self) {
        self.cancel_timer();

        let id = self.next_id();
        let delay = self.site_preview_delay;
        let tx = self.events_tx.clone();

        debug!(timer = id, delay_ms = delay.as_millis() as u64, "Arming site preview timer");

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(WizardEvent::SitePreviewDelayElapsed { timer: TimerId(id) });
        });
        self.timer = Some(Running { id, task });
    }

    fn cancel_timer(&mut self) {
        if let Some(armed) = self.timer.take() {
            debug!(timer = armed.id, "Cancelling site preview timer");
            armed.task.abort();
        }
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        self.stop();
    }
}
