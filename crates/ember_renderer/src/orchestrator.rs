//! Live render sessions.
//!
//! An [`Orchestrator`] owns one background worker that keeps issuing render
//! passes until the target sample count is reached, and forwards parameter
//! edits from a display to that worker. The worker is the only thread that
//! touches the [`Renderer`]; it turns each edit into commands against its
//! own sample count, so a reset can never race a pass.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::{Camera, Frame, Hittable, RenderError, RenderHandle, Renderer};

/// Receiver of completed frames, typically a display surface.
///
/// Last write wins: the worker does not wait for a frame to be consumed.
pub trait FrameSink: Send + Sync {
    fn set_frame(&self, frame: Frame);
}

impl<F> FrameSink for F
where
    F: Fn(Frame) + Send + Sync,
{
    fn set_frame(&self, frame: Frame) {
        self(frame)
    }
}

/// A sink that keeps only the most recent frame.
#[derive(Debug, Default)]
pub struct LatestFrame {
    frame: Mutex<Option<Frame>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Frame> {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take(&self) -> Option<Frame> {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl FrameSink for LatestFrame {
    fn set_frame(&self, frame: Frame) {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }
}

/// Callbacks a display emits when the user edits render parameters.
pub trait ParameterListener {
    fn on_samples_changed(&self, samples: u32);
    fn on_max_depth_changed(&self, max_depth: u32);
    fn on_lens_radius_changed(&self, lens_radius: f32);
    fn on_window_closing(&self);
}

/// A parameter edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterEvent {
    SamplesChanged(u32),
    MaxDepthChanged(u32),
    LensRadiusChanged(f32),
    WindowClosing,
}

/// Instruction for the render worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Resume passes if the target is not reached yet
    Start,
    /// Stop issuing passes
    Stop,
    /// Discard all accumulated samples
    Reset,
    SetTarget(u32),
    SetMaxDepth(u32),
    SetLensRadius(f32),
    /// Exit the worker loop
    Shutdown,
}

/// What to do about one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Whether the pass in flight is stale once this event lands
    pub interrupt: bool,
    pub commands: Vec<Command>,
}

/// Decide how to react to `event` given the current sample count.
///
/// The worker calls this between passes with the exact count. The
/// dispatching thread calls it with a snapshot only to decide whether to
/// interrupt the pass in flight.
///
/// Any change to the physics of a sample (depth, aperture) invalidates the
/// accumulated sums, as does lowering the target below what is already
/// accumulated: the buffer holds sums, so excess samples cannot be removed.
/// Raising the target keeps all progress. Asking for exactly what is
/// already accumulated stops the render where it is.
pub fn plan(event: ParameterEvent, accumulated: u32) -> Plan {
    use Command::*;

    match event {
        ParameterEvent::SamplesChanged(target) if accumulated > target => Plan {
            interrupt: true,
            commands: vec![Stop, Reset, SetTarget(target), Start],
        },
        ParameterEvent::SamplesChanged(target) if accumulated < target => Plan {
            interrupt: false,
            commands: vec![Stop, SetTarget(target), Start],
        },
        ParameterEvent::SamplesChanged(target) => Plan {
            interrupt: true,
            commands: vec![Stop, SetTarget(target)],
        },
        ParameterEvent::MaxDepthChanged(depth) => Plan {
            interrupt: true,
            commands: vec![Stop, Reset, SetMaxDepth(depth), Start],
        },
        ParameterEvent::LensRadiusChanged(radius) => Plan {
            interrupt: true,
            commands: vec![Stop, Reset, SetLensRadius(radius), Start],
        },
        ParameterEvent::WindowClosing => Plan {
            interrupt: true,
            commands: vec![Stop, Shutdown],
        },
    }
}

/// An event on its way to the worker. `ack` is signalled once it is applied.
struct Request {
    event: ParameterEvent,
    ack: Option<Sender<()>>,
}

struct Worker {
    renderer: Renderer,
    camera: Arc<Camera>,
    world: Arc<dyn Hittable>,
    sink: Arc<dyn FrameSink>,
    target: u32,
    has_work: bool,
}

impl Worker {
    fn run(mut self, requests: Receiver<Request>) {
        log::info!("Render worker started, target {} samples", self.target);

        loop {
            // Pending edits always win over the next pass
            let request = if self.has_work {
                match requests.try_recv() {
                    Ok(request) => Some(request),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => break,
                }
            } else {
                match requests.recv() {
                    Ok(request) => Some(request),
                    Err(_) => break,
                }
            };

            match request {
                Some(request) => {
                    let exit = self.handle(request.event);
                    if let Some(ack) = request.ack {
                        let _ = ack.send(());
                    }
                    if exit {
                        break;
                    }
                }
                None => self.pass(),
            }
        }

        log::info!(
            "Render worker stopped at {} samples",
            self.renderer.samples_accumulated()
        );
    }

    /// Plan `event` against the current count and apply it. No pass is
    /// running here. Returns true if the worker should exit.
    fn handle(&mut self, event: ParameterEvent) -> bool {
        let plan = plan(event, self.renderer.samples_accumulated());
        log::debug!("{event:?} -> {:?}", plan.commands);
        plan.commands
            .into_iter()
            .fold(false, |exit, command| self.apply(command) || exit)
    }

    /// Returns true if the worker should exit.
    fn apply(&mut self, command: Command) -> bool {
        log::debug!("Applying {command:?}");
        match command {
            Command::Start => {
                self.has_work = self.renderer.samples_accumulated() < self.target;
            }
            Command::Stop => self.has_work = false,
            Command::Reset => self.renderer.reset(),
            Command::SetTarget(target) => self.target = target,
            Command::SetMaxDepth(depth) => self.renderer.set_max_depth(depth),
            Command::SetLensRadius(radius) => self.camera.set_lens_radius(radius),
            Command::Shutdown => {
                self.has_work = false;
                return true;
            }
        }
        false
    }

    fn pass(&mut self) {
        let Some(frame) = self.renderer.render(&self.camera, self.world.as_ref()) else {
            return;
        };

        let samples = frame.samples();
        self.sink.set_frame(frame);

        if samples >= self.target {
            self.has_work = false;
            log::info!(
                "Converged at {} samples in {:?}",
                samples,
                self.renderer.elapsed()
            );
        }
    }
}

struct Session {
    requests: Sender<Request>,
    worker: JoinHandle<()>,
}

/// Keeps a render converging in the background while accepting live edits.
///
/// Events reach the worker in the order they were dispatched. A handler
/// that interrupts the pass in flight returns only after the worker has
/// applied the event, so by then the discarded pass has stopped and any
/// reset has happened. Raising the sample count interrupts nothing and
/// returns at once.
pub struct Orchestrator {
    session: Mutex<Option<Session>>,
    handle: RenderHandle,
}

impl Orchestrator {
    /// Start a session that renders until `target` samples are accumulated.
    pub fn spawn(
        renderer: Renderer,
        camera: Arc<Camera>,
        world: Arc<dyn Hittable>,
        sink: Arc<dyn FrameSink>,
        target: u32,
    ) -> Result<Self, RenderError> {
        let handle = renderer.handle();
        let (requests, receiver) = mpsc::channel();
        let worker = Worker {
            has_work: renderer.samples_accumulated() < target,
            renderer,
            camera,
            world,
            sink,
            target,
        };

        let worker = thread::Builder::new()
            .name("ember-render".to_owned())
            .spawn(move || worker.run(receiver))?;

        Ok(Self {
            session: Mutex::new(Some(Session { requests, worker })),
            handle,
        })
    }

    pub fn handle(&self) -> RenderHandle {
        self.handle.clone()
    }

    pub fn samples_accumulated(&self) -> u32 {
        self.handle.samples_accumulated()
    }

    /// True until the session has been closed.
    pub fn is_active(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Handle one parameter edit. Events after closing are ignored.
    pub fn dispatch(&self, event: ParameterEvent) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(active) = session.as_ref() else {
            log::debug!("Ignoring {event:?}, session closed");
            return;
        };

        // A needless interrupt costs one pass; the worker re-plans against
        // the exact count either way
        let closing = matches!(event, ParameterEvent::WindowClosing);
        let interrupt = plan(event, self.handle.samples_accumulated()).interrupt;
        if interrupt {
            self.handle.interrupt();
        }

        let (ack, acked) = mpsc::channel();
        let request = Request {
            event,
            ack: interrupt.then_some(ack),
        };
        log::debug!("Dispatching {event:?}, interrupt {interrupt}");

        if active.requests.send(request).is_ok() && interrupt {
            // An error here means the worker is gone; nothing left to wait for
            let _ = acked.recv();
        }

        if closing {
            if let Some(closed) = session.take() {
                if closed.worker.join().is_err() {
                    log::warn!("Render worker panicked");
                }
            }
        }
    }

    /// Close the session and join the worker.
    pub fn shutdown(&self) {
        self.dispatch(ParameterEvent::WindowClosing);
    }
}

impl ParameterListener for Orchestrator {
    fn on_samples_changed(&self, samples: u32) {
        self.dispatch(ParameterEvent::SamplesChanged(samples));
    }

    fn on_max_depth_changed(&self, max_depth: u32) {
        self.dispatch(ParameterEvent::MaxDepthChanged(max_depth));
    }

    fn on_lens_radius_changed(&self, lens_radius: f32) {
        self.dispatch(ParameterEvent::LensRadiusChanged(lens_radius));
    }

    fn on_window_closing(&self) {
        self.dispatch(ParameterEvent::WindowClosing);
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_world, HitRecord, Interval, Ray, Vec3};
    use ember_core::demo;
    use std::sync::Condvar;
    use std::time::{Duration, Instant};

    type Recorded = Arc<Mutex<Vec<u32>>>;

    fn camera() -> Arc<Camera> {
        Arc::new(Camera::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            0.0,
            90.0,
            4.0 / 3.0,
            1.0,
            0.0,
        ))
    }

    /// Session over a small two-sphere image recording each frame's sample count.
    fn session(width: u32, height: u32, target: u32) -> (Orchestrator, Arc<Camera>, Recorded) {
        let world: Arc<dyn Hittable> = Arc::new(build_world(&demo::two_spheres()).unwrap());
        let camera = camera();
        let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
        let frames = Arc::clone(&recorded);
        let sink = Arc::new(move |frame: Frame| frames.lock().unwrap().push(frame.samples()));

        let renderer = Renderer::new(width, height, 3).with_seed(17);
        let orchestrator =
            Orchestrator::spawn(renderer, Arc::clone(&camera), world, sink, target).unwrap();
        (orchestrator, camera, recorded)
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(20);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        condition()
    }

    fn frames(recorded: &Recorded) -> Vec<u32> {
        recorded.lock().unwrap().clone()
    }

    fn converge(recorded: &Recorded, count: usize) {
        assert!(
            wait_until(|| recorded.lock().unwrap().len() >= count),
            "only {:?} frames",
            frames(recorded)
        );
        // Give a runaway worker the chance to overshoot
        thread::sleep(Duration::from_millis(30));
    }

    #[test]
    fn test_plan_samples_lowered_resets() {
        let plan = plan(ParameterEvent::SamplesChanged(3), 5);
        assert!(plan.interrupt);
        assert_eq!(
            plan.commands,
            vec![Command::Stop, Command::Reset, Command::SetTarget(3), Command::Start]
        );
    }

    #[test]
    fn test_plan_samples_raised_keeps_progress() {
        let plan = plan(ParameterEvent::SamplesChanged(8), 5);
        assert!(!plan.interrupt);
        assert_eq!(
            plan.commands,
            vec![Command::Stop, Command::SetTarget(8), Command::Start]
        );
    }

    #[test]
    fn test_plan_samples_equal_stops() {
        let plan = plan(ParameterEvent::SamplesChanged(5), 5);
        assert!(plan.interrupt);
        assert_eq!(plan.commands, vec![Command::Stop, Command::SetTarget(5)]);
    }

    #[test]
    fn test_plan_physics_changes_reset() {
        let depth = plan(ParameterEvent::MaxDepthChanged(4), 0);
        assert!(depth.interrupt);
        assert_eq!(
            depth.commands,
            vec![Command::Stop, Command::Reset, Command::SetMaxDepth(4), Command::Start]
        );

        let lens = plan(ParameterEvent::LensRadiusChanged(0.2), 9);
        assert!(lens.interrupt);
        assert_eq!(
            lens.commands,
            vec![Command::Stop, Command::Reset, Command::SetLensRadius(0.2), Command::Start]
        );
    }

    #[test]
    fn test_plan_closing() {
        let plan = plan(ParameterEvent::WindowClosing, 2);
        assert!(plan.interrupt);
        assert_eq!(plan.commands, vec![Command::Stop, Command::Shutdown]);
    }

    #[test]
    fn test_session_stops_at_target() {
        let (orchestrator, _camera, recorded) = session(8, 6, 3);
        converge(&recorded, 3);

        assert_eq!(frames(&recorded), vec![1, 2, 3]);
        assert_eq!(orchestrator.samples_accumulated(), 3);
        assert!(!orchestrator.handle().is_running());
    }

    #[test]
    fn test_lower_target_restarts_from_zero() {
        let (orchestrator, _camera, recorded) = session(8, 6, 4);
        converge(&recorded, 4);

        orchestrator.on_samples_changed(2);
        converge(&recorded, 6);

        assert_eq!(frames(&recorded), vec![1, 2, 3, 4, 1, 2]);
        assert_eq!(orchestrator.samples_accumulated(), 2);
    }

    #[test]
    fn test_higher_target_keeps_progress() {
        let (orchestrator, _camera, recorded) = session(8, 6, 2);
        converge(&recorded, 2);

        orchestrator.on_samples_changed(4);
        converge(&recorded, 4);

        assert_eq!(frames(&recorded), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_equal_target_does_nothing() {
        let (orchestrator, _camera, recorded) = session(8, 6, 3);
        converge(&recorded, 3);

        orchestrator.on_samples_changed(3);
        thread::sleep(Duration::from_millis(50));

        assert_eq!(frames(&recorded), vec![1, 2, 3]);
        assert_eq!(orchestrator.samples_accumulated(), 3);
    }

    #[test]
    fn test_depth_change_resets() {
        let (orchestrator, _camera, recorded) = session(8, 6, 2);
        converge(&recorded, 2);

        orchestrator.on_max_depth_changed(1);
        converge(&recorded, 4);

        assert_eq!(frames(&recorded), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_lens_change_resets_and_applies() {
        let (orchestrator, camera, recorded) = session(8, 6, 2);
        converge(&recorded, 2);

        orchestrator.on_lens_radius_changed(0.3);

        // Applied before the handler returns
        assert_eq!(camera.lens_radius(), 0.3);
        converge(&recorded, 4);
        assert_eq!(frames(&recorded), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_reconfigure_while_rendering() {
        let (orchestrator, _camera, recorded) = session(64, 48, u32::MAX);
        assert!(wait_until(|| frames(&recorded).len() >= 2));

        let before = frames(&recorded).len();
        orchestrator.on_max_depth_changed(2);

        // Whatever landed before the reset, a fresh run starts from one sample
        assert!(wait_until(|| frames(&recorded)[before..].contains(&1)));
        let after = frames(&recorded);
        let restart = before + after[before..].iter().position(|&s| s == 1).unwrap();
        for (offset, samples) in after[restart..].iter().enumerate() {
            assert_eq!(*samples, offset as u32 + 1);
        }

        orchestrator.on_window_closing();
        assert!(!orchestrator.is_active());
        assert!(!orchestrator.handle().is_running());
    }

    #[test]
    fn test_resampling_at_current_count_never_overshoots() {
        let (orchestrator, _camera, _recorded) = session(1, 1, u32::MAX);

        for _ in 0..2000 {
            let current = orchestrator.samples_accumulated();
            orchestrator.on_samples_changed(current);
            let accumulated = orchestrator.samples_accumulated();
            assert!(
                accumulated <= current,
                "target {current}, accumulated {accumulated}"
            );
            orchestrator.on_samples_changed(u32::MAX);
        }

        orchestrator.on_window_closing();
    }

    /// Holds every ray until opened, keeping the first pass in flight.
    #[derive(Default)]
    struct Gate {
        open: Mutex<bool>,
        opened: Condvar,
    }

    impl Gate {
        fn open(&self) {
            *self.open.lock().unwrap() = true;
            self.opened.notify_all();
        }
    }

    impl Hittable for Gate {
        fn hit(&self, _ray: &Ray, _ray_t: Interval) -> Option<HitRecord<'_>> {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.opened.wait(open).unwrap();
            }
            None
        }
    }

    #[test]
    fn test_raising_target_returns_during_pass() {
        let gate = Arc::new(Gate::default());
        let renderer = Renderer::new(2, 2, 2);
        let orchestrator = Arc::new(
            Orchestrator::spawn(renderer, camera(), gate.clone(), Arc::new(LatestFrame::new()), 5)
                .unwrap(),
        );
        assert!(wait_until(|| orchestrator.handle().is_running()));

        let (done, returned) = mpsc::channel();
        let raiser = Arc::clone(&orchestrator);
        thread::spawn(move || {
            raiser.on_samples_changed(10);
            done.send(()).unwrap();
        });

        // Returns while the first pass is still held by the gate
        let result = returned.recv_timeout(Duration::from_secs(10));
        let still_running = orchestrator.handle().is_running();
        let accumulated = orchestrator.samples_accumulated();
        gate.open();
        assert!(result.is_ok());
        assert!(still_running);
        assert_eq!(accumulated, 0);

        assert!(wait_until(|| orchestrator.samples_accumulated() == 10));
        orchestrator.on_window_closing();
        assert!(!orchestrator.is_active());
    }

    #[test]
    fn test_events_after_close_are_ignored() {
        let (orchestrator, _camera, recorded) = session(8, 6, 1);
        converge(&recorded, 1);

        orchestrator.on_window_closing();
        orchestrator.on_samples_changed(10);
        orchestrator.on_window_closing();
        thread::sleep(Duration::from_millis(30));

        assert!(!orchestrator.is_active());
        assert_eq!(frames(&recorded), vec![1]);
    }

    #[test]
    fn test_latest_frame_sink() {
        let latest = Arc::new(LatestFrame::new());
        let world: Arc<dyn Hittable> = Arc::new(build_world(&demo::two_spheres()).unwrap());
        let renderer = Renderer::new(4, 3, 2);
        let orchestrator =
            Orchestrator::spawn(renderer, camera(), world, latest.clone(), 2).unwrap();

        assert!(wait_until(|| latest.latest().map(|f| f.samples()) == Some(2)));
        drop(orchestrator);

        let frame = latest.take().unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 3));
        assert!(latest.take().is_none());
    }
}
