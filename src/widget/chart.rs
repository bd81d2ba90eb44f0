use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

pub const GOAL: usize = 3;
pub const DEFAULT_DURATION: Duration = Duration::from_millis(800);
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// The two donut slices as currently drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub completed: f64,
    pub remaining: f64,
}

impl ChartFrame {
    pub fn settled(completed: usize, goal: usize) -> Self {
        Self::at(completed as f64, goal as f64)
    }

    fn at(completed: f64, goal: f64) -> Self {
        Self {
            completed,
            remaining: goal - completed,
        }
    }

    pub fn slices(&self) -> [f64; 2] {
        [self.completed, self.remaining]
    }
}

/// Quartic ease-in-out over `p` in `[0, 1]`.
pub fn ease_in_out_quart(p: f64) -> f64 {
    if p < 0.5 {
        8.0 * p.powi(4)
    } else {
        1.0 - (-2.0 * p + 2.0).powi(4) / 2.0
    }
}

/// One transition between two completed counts.
#[derive(Debug, Clone, Copy)]
pub struct Animation {
    start: f64,
    end: f64,
    goal: f64,
    duration: Duration,
}

impl Animation {
    pub fn new(start: f64, end: f64, goal: f64, duration: Duration) -> Self {
        Self {
            start,
            end,
            goal,
            duration,
        }
    }

    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Frame to draw after `elapsed`, and whether the transition is over.
    /// The final frame is exactly the end value.
    pub fn sample(&self, elapsed: Duration) -> (ChartFrame, bool) {
        let p = self.progress(elapsed);
        if p >= 1.0 {
            return (ChartFrame::at(self.end, self.goal), true);
        }
        let value = self.start + (self.end - self.start) * ease_in_out_quart(p);
        (ChartFrame::at(value, self.goal), false)
    }
}

/// Donut of completed versus remaining workouts out of the goal.
///
/// Every frame is published on a watch channel and drawn as-is, so the
/// drawing side never animates on its own. Only one ticker task is alive at
/// a time: `update` aborts the previous one before starting the next.
pub struct DonutChart {
    goal: usize,
    duration: Duration,
    frames: Arc<watch::Sender<ChartFrame>>,
    completed_label: usize,
    animation: Option<JoinHandle<()>>,
}

impl DonutChart {
    pub fn new(goal: usize) -> Self {
        let (frames, _) = watch::channel(ChartFrame::settled(0, goal));
        Self {
            goal,
            duration: DEFAULT_DURATION,
            frames: Arc::new(frames),
            completed_label: 0,
            animation: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn goal(&self) -> usize {
        self.goal
    }

    pub fn subscribe(&self) -> watch::Receiver<ChartFrame> {
        self.frames.subscribe()
    }

    pub fn displayed(&self) -> ChartFrame {
        *self.frames.borrow()
    }

    /// Count shown in the middle of the donut; jumps straight to the target.
    pub fn completed_label(&self) -> usize {
        self.completed_label
    }

    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Animates from whatever is drawn now towards `completed`. Must be
    /// called from within a tokio runtime.
    pub fn update(&mut self, completed: usize) {
        if let Some(previous) = self.animation.take() {
            previous.abort();
        }
        self.completed_label = completed;

        let start = self.displayed().completed;
        let animation = Animation::new(start, completed as f64, self.goal as f64, self.duration);
        debug!(start, end = completed, "animating donut");

        let frames = Arc::clone(&self.frames);
        self.animation = Some(tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(FRAME_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let (frame, done) = animation.sample(started.elapsed());
                frames.send_replace(frame);
                if done {
                    break;
                }
            }
        }));
    }

    /// Waits for the running animation, if any, to draw its final frame.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.animation.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for DonutChart {
    fn drop(&mut self) {
        if let Some(handle) = self.animation.take() {
            handle.abort();
        }
    }
}
