pub mod event;
pub mod ui;

use crate::api::PlatformClient;
use crate::cache::{save_cache, CacheData};
use crate::calendar::{self, AppointmentBuckets, CalendarDay};
use crate::models::{
    Activity, Appointment, Client, Message, Participant, ParticipantKind, Property,
    ThemeSettings, User,
};
use crate::theme::Theme;
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use ratatui::widgets::ListState as RListState;
use tokio::sync::oneshot;

// ─── Background Fetch Result ─────────────────────────────────────────────────

pub struct FetchResult {
    /// Matches the generation armed by `start_fetch`; stale results
    /// from a superseded fetch are discarded.
    pub generation: u64,
    pub user: Option<User>,
    pub properties: Vec<Property>,
    pub appointments: Vec<Appointment>,
    pub clients: Vec<Client>,
    pub messages: Vec<Message>,
    pub activities: Vec<Activity>,
    pub theme_settings: Option<ThemeSettings>,
    pub fetched_at: DateTime<Utc>,
    /// Non-fatal error message to show in the status bar.
    pub error: Option<String>,
}

// ─── Navigation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Properties,
    Calendar,
    Inbox,
    Clients,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Properties,
        Tab::Calendar,
        Tab::Inbox,
        Tab::Clients,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Properties => "Properties",
            Tab::Calendar => "Calendar",
            Tab::Inbox => "Inbox",
            Tab::Clients => "Clients",
        }
    }

    pub fn next(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        Tab::ALL[(idx + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        if idx == 0 {
            Tab::ALL[Tab::ALL.len() - 1]
        } else {
            Tab::ALL[idx - 1]
        }
    }
}

// ─── App State ──────────────────────────────────────────────────────────────

pub struct App {
    pub client: PlatformClient,
    pub running: bool,
    pub active_tab: Tab,
    pub theme: Theme,
    theme_settings_id: u64,

    // Data
    pub user: Option<User>,
    pub properties: Vec<Property>,
    pub appointments: Vec<Appointment>,
    pub clients: Vec<Client>,
    pub messages: Vec<Message>,
    pub activities: Vec<Activity>,

    // Calendar view state, owned exclusively here. The grid and the
    // buckets are derived values, recomputed whenever the data or the
    // month/selection changes.
    pub view_month: NaiveDate,
    pub selected_date: NaiveDate,
    pub grid: Vec<CalendarDay>,
    pub buckets: AppointmentBuckets,

    // UI state
    pub property_list_state: ListState,
    pub message_list_state: ListState,
    pub client_list_state: ListState,
    pub activity_list_state: ListState,

    // Status
    pub status_message: String,
    pub loading: bool,
    pub needs_refresh: bool,
    pub cached_at: Option<DateTime<Utc>>,

    // Background fetch channel
    fetch_rx: Option<oneshot::Receiver<FetchResult>>,
    fetch_generation: u64,

    // Incremented each frame; used to drive the loading spinner.
    pub frame_count: u64,
}

/// Tracks logical selection plus a persistent ratatui scroll offset.
///
/// `selected` is the index among selectable items; render functions
/// sync `inner.selected` before calling `render_stateful_widget`, so
/// ratatui adjusts the offset only at viewport edges.
pub struct ListState {
    pub inner: RListState,
    pub selected: usize,
    pub len: usize,
}

impl ListState {
    pub fn new() -> Self {
        let mut inner = RListState::default();
        inner.select(Some(0));
        Self { inner, selected: 0, len: 0 }
    }

    /// Move down — clamped at the last item (no wrap-around).
    pub fn select_next(&mut self) {
        if self.len > 0 && self.selected + 1 < self.len {
            self.selected += 1;
        }
    }

    /// Move up — clamped at the first item (no wrap-around).
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len && len > 0 {
            self.selected = len - 1;
        }
    }
}

impl App {
    pub fn new(client: PlatformClient, theme_settings_id: u64) -> Self {
        let today = Local::now().date_naive();
        let mut app = Self {
            client,
            running: true,
            active_tab: Tab::Dashboard,
            theme: Theme::default(),
            theme_settings_id,
            user: None,
            properties: Vec::new(),
            appointments: Vec::new(),
            clients: Vec::new(),
            messages: Vec::new(),
            activities: Vec::new(),
            view_month: today,
            selected_date: today,
            grid: Vec::new(),
            buckets: AppointmentBuckets::default(),
            property_list_state: ListState::new(),
            message_list_state: ListState::new(),
            client_list_state: ListState::new(),
            activity_list_state: ListState::new(),
            status_message: "Loading...".into(),
            loading: true,
            needs_refresh: false,
            cached_at: None,
            fetch_rx: None,
            fetch_generation: 0,
            frame_count: 0,
        };
        app.rebuild_calendar();
        app
    }

    /// Populate app state from a previously saved cache without making
    /// any network requests. After this call the UI is immediately
    /// usable.
    pub fn load_from_cache(&mut self, cache: CacheData) {
        self.user = cache.user;
        self.property_list_state.set_len(cache.properties.len());
        self.properties = cache.properties;
        self.appointments = cache.appointments;
        self.client_list_state.set_len(cache.clients.len());
        self.clients = cache.clients;
        self.message_list_state.set_len(cache.messages.len());
        self.messages = cache.messages;
        self.activity_list_state.set_len(cache.activities.len());
        self.activities = cache.activities;
        self.theme = Theme::resolve(cache.theme_settings.as_ref());

        self.sort_messages();
        self.rebuild_calendar();

        self.cached_at = Some(cache.cached_at);
        self.loading = false;

        let synced = cache
            .cached_at
            .with_timezone(&chrono::Local)
            .format("%b %d %H:%M");
        let name = self
            .user
            .as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_else(|| "Agent".into());
        self.status_message = format!(
            "Hi, {name}! Showing cached data from {synced} — press r to refresh."
        );
    }

    /// Spawn a background task that fetches all platform data without
    /// blocking the event loop. A fetch started while another is in
    /// flight supersedes it: the old channel is dropped and its result
    /// discarded unseen (latest fetch wins).
    pub fn start_fetch(&mut self) {
        self.fetch_generation += 1;
        let generation = self.fetch_generation;
        let client = self.client.clone();
        let theme_id = self.theme_settings_id;
        let (tx, rx) = oneshot::channel();
        self.fetch_rx = Some(rx);
        self.loading = true;
        self.status_message = "Syncing in background…".into();
        tokio::spawn(async move {
            let result = fetch_platform_data(client, theme_id, generation).await;
            let _ = tx.send(result);
        });
    }

    /// Check the background fetch channel without blocking. Returns
    /// `true` and applies the result to app state when data from the
    /// current fetch generation has arrived.
    pub fn poll_fetch_result(&mut self) -> bool {
        let result = match self.fetch_rx.as_mut() {
            None => return false,
            Some(rx) => match rx.try_recv() {
                Ok(r) => r,
                Err(oneshot::error::TryRecvError::Empty) => return false,
                Err(oneshot::error::TryRecvError::Closed) => {
                    // The fetch task died without sending; unlock the
                    // UI so a manual refresh can start a new one.
                    self.fetch_rx = None;
                    self.loading = false;
                    self.status_message =
                        "Sync failed unexpectedly — press r to retry.".into();
                    tracing::warn!("background fetch task dropped its channel without a result");
                    return false;
                }
            },
        };
        self.fetch_rx = None;
        if result.generation != self.fetch_generation {
            tracing::debug!(
                got = result.generation,
                want = self.fetch_generation,
                "dropping superseded fetch result"
            );
            return false;
        }
        self.apply_fetch_result(result);
        true
    }

    fn apply_fetch_result(&mut self, result: FetchResult) {
        self.user = result.user;
        self.property_list_state.set_len(result.properties.len());
        self.properties = result.properties;
        self.appointments = result.appointments;
        self.client_list_state.set_len(result.clients.len());
        self.clients = result.clients;
        self.message_list_state.set_len(result.messages.len());
        self.messages = result.messages;
        self.activity_list_state.set_len(result.activities.len());
        self.activities = result.activities;
        self.theme = Theme::resolve(result.theme_settings.as_ref());

        self.sort_messages();
        self.rebuild_calendar();

        self.cached_at = Some(result.fetched_at);
        self.loading = false;

        if let Some(err) = result.error {
            self.status_message = format!("Sync error: {err}");
        } else {
            let name = self
                .user
                .as_ref()
                .and_then(|u| u.name.clone())
                .unwrap_or_else(|| "Agent".into());
            let synced = result
                .fetched_at
                .with_timezone(&chrono::Local)
                .format("%b %d %H:%M");
            self.status_message = format!(
                "Welcome, {name}! {} properties, {} appointments. Synced {synced}.",
                self.properties.len(),
                self.appointments.len()
            );
        }
    }

    // ── Calendar ─────────────────────────────────────────────────────────

    /// Recompute the month grid and the agenda buckets from scratch.
    /// Cheap enough to run on every navigation step.
    pub fn rebuild_calendar(&mut self) {
        let today = Local::now().date_naive();
        self.grid = calendar::month_grid(self.view_month, today, &self.appointments);
        self.buckets = calendar::bucket_appointments(&self.appointments, self.selected_date, today);
    }

    pub fn next_month(&mut self) {
        self.view_month = calendar::next_month(self.view_month);
        self.rebuild_calendar();
    }

    pub fn prev_month(&mut self) {
        self.view_month = calendar::prev_month(self.view_month);
        self.rebuild_calendar();
    }

    /// Move the selected date by whole days; crossing a month boundary
    /// navigates the grid along with it.
    pub fn move_selected_date(&mut self, days: i64) {
        self.selected_date += chrono::Duration::days(days);
        if self.selected_date.month() != self.view_month.month()
            || self.selected_date.year() != self.view_month.year()
        {
            self.view_month = self.selected_date;
        }
        self.rebuild_calendar();
    }

    pub fn jump_to_today(&mut self) {
        let today = Local::now().date_naive();
        self.selected_date = today;
        self.view_month = today;
        self.rebuild_calendar();
    }

    // ── Inbox ────────────────────────────────────────────────────────────

    fn sort_messages(&mut self) {
        // Newest first; undated messages sink to the bottom.
        self.messages.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
    }

    pub fn selected_message(&self) -> Option<&Message> {
        self.messages.get(self.message_list_state.selected)
    }

    /// Resolve a message sender against the fetched user and client
    /// lists. Returns `None` when the referenced record is unknown.
    pub fn resolve_sender(&self, message: &Message) -> Option<Participant<'_>> {
        match message.sender_kind {
            ParticipantKind::User => self
                .user
                .as_ref()
                .filter(|u| u.id == message.sender_id)
                .map(Participant::User),
            ParticipantKind::Client => self
                .clients
                .iter()
                .find(|c| c.id == message.sender_id)
                .map(Participant::Client),
        }
    }

    pub fn unread_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.read == Some(false))
            .count()
    }

    pub fn active_list_state_mut(&mut self) -> Option<&mut ListState> {
        match self.active_tab {
            Tab::Dashboard => Some(&mut self.activity_list_state),
            Tab::Properties => Some(&mut self.property_list_state),
            Tab::Calendar => None,
            Tab::Inbox => Some(&mut self.message_list_state),
            Tab::Clients => Some(&mut self.client_list_state),
        }
    }
}

// ─── Background fetch (runs in a spawned task) ───────────────────────────────

async fn fetch_platform_data(
    client: PlatformClient,
    theme_settings_id: u64,
    generation: u64,
) -> FetchResult {
    let mut result = FetchResult {
        generation,
        user: None,
        properties: Vec::new(),
        appointments: Vec::new(),
        clients: Vec::new(),
        messages: Vec::new(),
        activities: Vec::new(),
        theme_settings: None,
        fetched_at: Utc::now(),
        error: None,
    };

    match client.get_self().await {
        Ok(user) => result.user = Some(user),
        Err(e) => {
            result.error = Some(format!("fetching profile: {e}"));
            return result;
        }
    }

    match client.list_properties().await {
        Ok(properties) => result.properties = properties,
        Err(e) => {
            result.error = Some(format!("fetching properties: {e}"));
            return result;
        }
    }

    match client.list_appointments().await {
        Ok(appointments) => result.appointments = appointments,
        Err(e) => {
            result.error = Some(format!("fetching appointments: {e}"));
            return result;
        }
    }

    match client.list_clients().await {
        Ok(clients) => result.clients = clients,
        Err(e) => note_sync_error(&mut result.error, format!("fetching clients: {e}")),
    }

    match client.list_messages().await {
        Ok(messages) => result.messages = messages,
        Err(e) => note_sync_error(&mut result.error, format!("fetching messages: {e}")),
    }

    match client.list_activities().await {
        Ok(activities) => result.activities = activities,
        Err(e) => note_sync_error(&mut result.error, format!("fetching activities: {e}")),
    }

    // A missing theme record is not an error: the UI falls back to the
    // default theme for every unset value.
    match client.get_theme_settings(theme_settings_id).await {
        Ok(settings) => result.theme_settings = Some(settings),
        Err(e) => tracing::warn!("theme settings unavailable, using defaults: {e}"),
    }

    result.fetched_at = Utc::now();
    tracing::info!(
        properties = result.properties.len(),
        appointments = result.appointments.len(),
        messages = result.messages.len(),
        "sync complete"
    );

    // Save cache from within the background task so the main thread
    // never blocks.
    let cache = CacheData {
        cached_at: result.fetched_at,
        user: result.user.clone(),
        properties: result.properties.clone(),
        appointments: result.appointments.clone(),
        clients: result.clients.clone(),
        messages: result.messages.clone(),
        activities: result.activities.clone(),
        theme_settings: result.theme_settings.clone(),
    };
    if let Err(e) = save_cache(&cache) {
        result.error = Some(format!("saving cache: {e}"));
    }

    result
}

/// Record a partial-sync failure: warned to the log, and appended to
/// the status line so an earlier failure is not clobbered.
fn note_sync_error(slot: &mut Option<String>, message: String) {
    tracing::warn!("{message}");
    match slot {
        Some(existing) => {
            existing.push_str("; ");
            existing.push_str(&message);
        }
        None => *slot = Some(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let client = PlatformClient::new("https://x.example", "token").unwrap();
        App::new(client, 1)
    }

    #[test]
    fn sync_errors_accumulate_instead_of_clobbering() {
        let mut slot = None;
        note_sync_error(&mut slot, "fetching clients: boom".into());
        note_sync_error(&mut slot, "fetching activities: HTTP 500".into());
        assert_eq!(
            slot.as_deref(),
            Some("fetching clients: boom; fetching activities: HTTP 500")
        );
    }

    #[test]
    fn dead_fetch_task_unlocks_loading() {
        let mut app = test_app();
        let (tx, rx) = oneshot::channel::<FetchResult>();
        app.fetch_rx = Some(rx);
        app.loading = true;
        drop(tx);

        assert!(!app.poll_fetch_result());
        assert!(!app.loading);
        assert!(app.fetch_rx.is_none());
        assert!(app.status_message.contains("press r to retry"));
    }
}
