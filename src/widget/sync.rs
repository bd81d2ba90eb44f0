use crate::errors::ClientError;
use crate::models::{PrizeDetails, WorkoutRecord, WorkoutsResponse};
use crate::widget::api::WorkoutApi;
use crate::widget::chart::{DonutChart, GOAL};
use crate::widget::popup::Popups;
use crate::widget::render::{render_days, DayBox, PrizeSlot};
use crate::widget::store::WorkoutStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const HAPTIC_PULSE: Duration = Duration::from_millis(50);

pub type Haptics = Box<dyn Fn(Duration) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Loading,
    Ready,
    Toggling,
    ToggleFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Confirmed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayClick {
    Toggled(ReconciliationOutcome),
    OpenedMessage,
    Ignored,
}

/// An optimistic toggle that has been applied locally and still awaits the
/// server's answer.
#[derive(Debug, Clone)]
pub struct PendingToggle {
    id: u64,
    date: NaiveDate,
    message: String,
    previous: Option<WorkoutRecord>,
}

impl PendingToggle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Toggles for one date issued since the last time none were in flight.
#[derive(Debug, Default)]
struct DateRequests {
    /// Requests that have not failed, with the message each one sent.
    live: BTreeMap<u64, String>,
    in_flight: usize,
    /// Pre-toggle record of the oldest request that failed.
    first_failure: Option<(u64, Option<WorkoutRecord>)>,
}

/// What a failed toggle puts back into the store.
#[derive(Debug)]
enum Rollback {
    /// Other toggles are still live: flip `completed` and show the newest
    /// live message.
    Message(String),
    /// Every toggle of the batch failed: the record from before the batch.
    Record(Option<WorkoutRecord>),
}

/// Owns the widget state and keeps it in step with the server: initial load,
/// optimistic toggles with rollback, and the prize reveal.
pub struct SyncController<A> {
    api: A,
    today: NaiveDate,
    state: SyncState,
    store: WorkoutStore,
    range: Vec<NaiveDate>,
    day_boxes: Vec<DayBox>,
    chart: DonutChart,
    popups: Popups,
    prize_slot: PrizeSlot,
    message_input: String,
    next_request_id: u64,
    requests: BTreeMap<NaiveDate, DateRequests>,
    haptics: Option<Haptics>,
}

impl<A: WorkoutApi> SyncController<A> {
    pub fn new(api: A, today: NaiveDate) -> Self {
        Self {
            api,
            today,
            state: SyncState::Loading,
            store: WorkoutStore::new(),
            range: Vec::new(),
            day_boxes: Vec::new(),
            chart: DonutChart::new(GOAL),
            popups: Popups::default(),
            prize_slot: PrizeSlot::Placeholder,
            message_input: String::new(),
            next_request_id: 1,
            requests: BTreeMap::new(),
            haptics: None,
        }
    }

    pub fn with_chart(mut self, chart: DonutChart) -> Self {
        self.chart = chart;
        self
    }

    pub fn with_haptics(mut self, haptics: Haptics) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
        self.render();
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn range(&self) -> &[NaiveDate] {
        &self.range
    }

    pub fn day_boxes(&self) -> &[DayBox] {
        &self.day_boxes
    }

    pub fn chart(&self) -> &DonutChart {
        &self.chart
    }

    pub fn popups(&self) -> &Popups {
        &self.popups
    }

    pub fn popups_mut(&mut self) -> &mut Popups {
        &mut self.popups
    }

    pub fn prize_slot(&self) -> &PrizeSlot {
        &self.prize_slot
    }

    pub fn message_input(&self) -> &str {
        &self.message_input
    }

    pub fn set_message_input(&mut self, message: impl Into<String>) {
        self.message_input = message.into();
    }

    pub fn completed_count(&self) -> usize {
        self.store.count_completed(&self.range)
    }

    pub async fn settle_chart(&mut self) {
        self.chart.settle().await;
    }

    /// Fetches the visible range. A failed load leaves an empty, fully
    /// usable widget behind.
    pub async fn load(&mut self) {
        self.state = SyncState::Loading;
        match self.api.load().await {
            Ok(response) => self.apply_loaded(response),
            Err(err) => {
                warn!("failed to load workouts, starting empty: {err}");
                self.store = WorkoutStore::new();
                self.range.clear();
            }
        }
        self.state = SyncState::Ready;
        self.render();
        self.check_prize().await;
    }

    fn apply_loaded(&mut self, response: WorkoutsResponse) {
        self.range = if response.dates.is_empty() {
            response.workouts.keys().copied().collect()
        } else {
            response.dates
        };
        self.store = WorkoutStore::from_workouts(response.workouts);
        if let Some(record) = self.store.get(self.today).filter(|r| r.has_message()) {
            self.message_input = record.message.clone();
        }
        info!(days = self.range.len(), "loaded workouts");
    }

    /// Applies today's toggle locally and re-renders before anything is
    /// sent. Returns `None` when today is not on screen.
    pub fn begin_toggle(&mut self) -> Option<PendingToggle> {
        let date = self.today;
        if !self.range.contains(&date) {
            debug!(%date, "today is outside the visible range, nothing to toggle");
            return None;
        }

        let message = self.message_input.trim().to_string();
        let previous = self.store.toggle_completed(date, &message);
        let id = self.next_request_id;
        self.next_request_id += 1;

        let requests = self.requests.entry(date).or_default();
        requests.live.insert(id, message.clone());
        requests.in_flight += 1;

        self.state = SyncState::Toggling;
        if let Some(haptics) = &self.haptics {
            haptics(HAPTIC_PULSE);
        }
        self.render();

        Some(PendingToggle {
            id,
            date,
            message,
            previous,
        })
    }

    /// Reconciles a pending toggle with the server's answer.
    ///
    /// `completed` is reverted by flipping it again, which keeps the store
    /// equal to the server whatever order responses arrive in. The message
    /// falls back to the newest toggle that has not failed, or to the record
    /// from before the first toggle once all of them failed.
    pub fn finish_toggle(
        &mut self,
        toggle: PendingToggle,
        result: Result<(), ClientError>,
    ) -> ReconciliationOutcome {
        let rollback = self.settle_request(&toggle, result.is_err());

        let outcome = match (result, rollback) {
            (Ok(()), _) => {
                info!(date = %toggle.date, request = toggle.id, "workout toggle saved");
                ReconciliationOutcome::Confirmed
            }
            (Err(err), rollback) => {
                warn!(date = %toggle.date, request = toggle.id, "failed to save workout, rolling back: {err}");
                self.state = SyncState::ToggleFailed;
                if let Some(rollback) = rollback {
                    self.revert(toggle.date, rollback);
                }
                self.render();
                ReconciliationOutcome::RolledBack
            }
        };

        self.state = if self.requests.is_empty() {
            SyncState::Ready
        } else {
            SyncState::Toggling
        };
        outcome
    }

    fn settle_request(&mut self, toggle: &PendingToggle, failed: bool) -> Option<Rollback> {
        let requests = self.requests.entry(toggle.date).or_default();
        requests.in_flight = requests.in_flight.saturating_sub(1);

        let rollback = if failed {
            requests.live.remove(&toggle.id);
            if requests
                .first_failure
                .as_ref()
                .is_none_or(|(id, _)| toggle.id < *id)
            {
                requests.first_failure = Some((toggle.id, toggle.previous.clone()));
            }
            Some(match requests.live.last_key_value() {
                Some((_, message)) => Rollback::Message(message.clone()),
                None => Rollback::Record(
                    requests
                        .first_failure
                        .as_ref()
                        .and_then(|(_, previous)| previous.clone()),
                ),
            })
        } else {
            None
        };

        if requests.in_flight == 0 {
            self.requests.remove(&toggle.date);
        }
        rollback
    }

    fn revert(&mut self, date: NaiveDate, rollback: Rollback) {
        match rollback {
            Rollback::Message(message) => {
                let mut record = self.store.get(date).cloned().unwrap_or_default();
                record.completed = !record.completed;
                record.message = message;
                self.store.set(date, record);
            }
            Rollback::Record(previous) => self.store.restore(date, previous),
        }
    }

    /// Optimistic toggle of today's box followed by the server round trip.
    pub async fn toggle_today(&mut self) -> Option<ReconciliationOutcome> {
        let toggle = self.begin_toggle()?;
        let wants_prize = self.prize_due();

        let api = &self.api;
        let (result, prize) = tokio::join!(api.toggle(toggle.date, &toggle.message), async {
            if wants_prize {
                Some(api.prize().await)
            } else {
                None
            }
        });

        if let Some(prize) = prize {
            self.apply_prize(prize);
        }
        let outcome = self.finish_toggle(toggle, result);
        self.sync_prize_slot();
        Some(outcome)
    }

    /// Stores the message input as today's note without touching
    /// completion. The store changes only once the server accepted it.
    pub async fn save_message(&mut self) -> Result<(), ClientError> {
        let date = self.today;
        let message = self.message_input.trim().to_string();
        match self.api.save_message(date, &message).await {
            Ok(()) => {
                let mut record = self.store.get(date).cloned().unwrap_or_default();
                record.message = message;
                self.store.set(date, record);
                self.render();
                Ok(())
            }
            Err(err) => {
                warn!(%date, "failed to save message: {err}");
                Err(err)
            }
        }
    }

    pub async fn click_day(&mut self, date: NaiveDate) -> DayClick {
        if date == self.today {
            return match self.toggle_today().await {
                Some(outcome) => DayClick::Toggled(outcome),
                None => DayClick::Ignored,
            };
        }

        if self.show_message(date) {
            DayClick::OpenedMessage
        } else {
            DayClick::Ignored
        }
    }

    /// Opens the message popup with the note stored for `date`, today
    /// included. Never toggles.
    pub fn show_message(&mut self, date: NaiveDate) -> bool {
        match self.store.get(date).filter(|record| record.has_message()) {
            Some(record) => {
                let message = record.message.clone();
                self.popups.message.open(message);
                true
            }
            None => false,
        }
    }

    /// Opens the prize popup once the goal is met.
    pub async fn click_prize_box(&mut self) -> bool {
        if self.completed_count() < self.chart.goal() {
            return false;
        }
        match self.api.prize().await {
            Ok(prize) => {
                self.popups.prize.open(prize);
                true
            }
            Err(err) => {
                warn!("failed to fetch prize: {err}");
                false
            }
        }
    }

    pub async fn check_prize(&mut self) {
        self.sync_prize_slot();
        if self.prize_due() {
            let prize = self.api.prize().await;
            self.apply_prize(prize);
        }
    }

    fn prize_due(&self) -> bool {
        self.completed_count() >= self.chart.goal()
            && !matches!(self.prize_slot, PrizeSlot::Revealed(_))
    }

    fn sync_prize_slot(&mut self) {
        if self.completed_count() < self.chart.goal() {
            self.prize_slot = PrizeSlot::Placeholder;
        }
    }

    fn apply_prize(&mut self, prize: Result<PrizeDetails, ClientError>) {
        match prize {
            Ok(prize) if self.completed_count() >= self.chart.goal() => {
                info!(prize = %prize.name, "prize revealed");
                self.prize_slot = PrizeSlot::Revealed(prize);
            }
            Ok(_) => self.prize_slot = PrizeSlot::Placeholder,
            Err(err) => {
                warn!("failed to fetch prize: {err}");
                self.prize_slot = PrizeSlot::Placeholder;
            }
        }
    }

    fn render(&mut self) {
        self.day_boxes = render_days(&self.range, &self.store, self.today);
        self.chart.update(self.completed_count());
        self.sync_prize_slot();
    }
}
