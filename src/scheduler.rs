//! Frame scheduler
//!
//! Owns the model and drives it once per animation frame:
//! delta timer → `sim::update(Frame)` → save → (driver renders and requests
//! the next frame). The driver asks for another frame whenever `tick`
//! returns `Reschedule`.
//!
//! Hidden pages keep the frame chain alive but neither simulate nor save.
//! Saves are synchronous and happen after the update inside the same tick,
//! so there is never more than one write in flight.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::persistence::{PersistedStateStore, Storage, StorageError};
use crate::sim::{DeltaTimer, Event, RootModel, Viewport, update};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, no frame loop yet
    Idle,
    /// Frame loop active
    Running,
    /// Stopped for good
    Stopped,
}

/// What the driver should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Request another animation frame
    Reschedule,
    /// Let the loop end
    Halt,
}

/// Page visibility as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Shared stop flag for the frame loop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Model written by another context, waiting for `resync`
type PendingModel = Rc<RefCell<Option<RootModel>>>;

pub struct FrameScheduler<S: Storage> {
    model: RootModel,
    timer: DeltaTimer,
    store: PersistedStateStore<S>,
    rng: Pcg32,
    state: SchedulerState,
    cancel: CancelToken,
    pending: PendingModel,
    frames: u64,
    failed_saves: u32,
}

impl<S: Storage> FrameScheduler<S> {
    /// Create a scheduler, restoring the saved model if there is one
    pub fn new(store: PersistedStateStore<S>, seed: u64) -> Self {
        let model = store.load().unwrap_or_default();
        Self::with_model(store, model, seed)
    }

    /// Create a scheduler around an explicit model
    pub fn with_model(store: PersistedStateStore<S>, model: RootModel, seed: u64) -> Self {
        Self {
            model,
            timer: DeltaTimer::new(0.0),
            store,
            rng: Pcg32::seed_from_u64(seed),
            state: SchedulerState::Idle,
            cancel: CancelToken::default(),
            pending: Rc::default(),
            frames: 0,
            failed_saves: 0,
        }
    }

    pub fn model(&self) -> &RootModel {
        &self.model
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn store(&self) -> &PersistedStateStore<S> {
        &self.store
    }

    /// Frames simulated so far (hidden frames excluded)
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Token that stops the loop when cancelled
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Begin the frame loop. Only the first call has an effect.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.state != SchedulerState::Idle {
            log::warn!("Scheduler start ignored in state {:?}", self.state);
            return false;
        }
        self.timer = DeltaTimer::new(now_ms);
        self.state = SchedulerState::Running;
        log::info!("Frame loop started");
        true
    }

    /// Stop the frame loop permanently
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if self.state != SchedulerState::Stopped {
            self.state = SchedulerState::Stopped;
            log::info!("Frame loop stopped after {} frames", self.frames);
        }
    }

    /// Run one animation frame
    pub fn tick(&mut self, now_ms: f64, visibility: Visibility, viewport: Viewport) -> TickOutcome {
        if self.cancel.is_cancelled() {
            self.stop();
        }
        if self.state != SchedulerState::Running {
            return TickOutcome::Halt;
        }

        // Hidden frames still consume time so that resuming starts with a
        // normal-sized step.
        let tick = self.timer.advance(now_ms);
        if visibility == Visibility::Hidden {
            return TickOutcome::Reschedule;
        }

        update(&mut self.model, Event::Frame(tick), viewport, &mut self.rng);
        self.frames += 1;
        self.persist();

        TickOutcome::Reschedule
    }

    /// Apply a pointer or drop event between frames
    pub fn dispatch(&mut self, event: Event, viewport: Viewport) {
        if self.state == SchedulerState::Stopped {
            return;
        }
        update(&mut self.model, event, viewport, &mut self.rng);
    }

    /// Start listening for models written by other contexts.
    ///
    /// Changes are held until `resync` instead of being applied mid-loop.
    pub fn watch_external(&self) -> Result<(), StorageError> {
        let pending = self.pending.clone();
        self.store.on_external_change(move |model| {
            if let Some(model) = model {
                *pending.borrow_mut() = Some(model);
            }
        })
    }

    /// Adopt the latest externally written model, if any
    pub fn resync(&mut self) -> bool {
        match self.pending.borrow_mut().take() {
            Some(model) => {
                log::info!("Resynced model from another context");
                self.model = model;
                true
            }
            None => false,
        }
    }

    fn persist(&mut self) {
        match self.store.save(&self.model) {
            Ok(()) => {
                if self.failed_saves > 0 {
                    log::info!("Saving recovered after {} failures", self.failed_saves);
                    self.failed_saves = 0;
                }
            }
            Err(e) => {
                // Log once per failure streak
                if self.failed_saves == 0 {
                    log::warn!("Failed to save model: {}", e);
                }
                self.failed_saves += 1;
            }
        }
    }
}
