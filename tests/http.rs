use chrono::NaiveDate;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use workout_tracker::calendar::{date_key, today, week_id};
use workout_tracker::models::{PrizeDetails, WorkoutsResponse};
use workout_tracker::widget::sync::SyncState;
use workout_tracker::widget::{HttpWorkoutApi, ReconciliationOutcome, SyncController};

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_temp_path(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("workout_tracker_{tag}_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

fn write_prize_file() -> String {
    let path = unique_temp_path("prizes");
    let (year, week) = week_id(today())
        .split_once('-')
        .map(|(year, week)| (year.to_string(), week.to_string()))
        .unwrap();
    let body = serde_json::json!([{
        "year": year.parse::<i32>().unwrap(),
        "week": week.parse::<u32>().unwrap(),
        "name": "Pasta night",
        "description": "My treat",
        "image": "Prize_Pasta.gif"
    }]);
    std::fs::write(&path, body.to_string()).expect("write prize file");
    path
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/workouts")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_workout_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", unique_temp_path("data"))
        .env("APP_PRIZES_PATH", write_prize_file())
        .env("APP_DATE_WINDOW", "week")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn fetch_workouts(client: &Client, base_url: &str) -> WorkoutsResponse {
    client
        .get(format!("{base_url}/workouts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_toggle_workout_flips_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let today = today();

    let before = fetch_workouts(&client, &server.base_url).await;
    assert_eq!(before.dates.len(), 7);
    assert!(before.dates.contains(&today));
    let was_completed = before.workouts[&today].completed;

    let response = client
        .post(format!("{}/toggle_workout", server.base_url))
        .json(&serde_json::json!({ "date": date_key(today), "message": "  intervals " }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let after = fetch_workouts(&client, &server.base_url).await;
    assert_eq!(after.workouts[&today].completed, !was_completed);
    assert_eq!(after.workouts[&today].message, "intervals");

    let response = client
        .post(format!("{}/toggle_workout", server.base_url))
        .json(&serde_json::json!({ "date": date_key(today) }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let restored = fetch_workouts(&client, &server.base_url).await;
    assert_eq!(restored.workouts[&today].completed, was_completed);
    assert_eq!(restored.workouts[&today].message, "");
}

#[tokio::test]
async fn http_rejects_malformed_dates_and_weeks() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/toggle_workout", server.base_url))
        .json(&serde_json::json!({ "date": "19/10/2026" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/workouts?week=next", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_week_query_returns_monday_start_week() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let api = HttpWorkoutApi::new(format!("{}/", server.base_url));
    let week = api.load_week("2025-14").await.unwrap();
    let monday = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    assert_eq!(week.dates.first(), Some(&monday));
    assert_eq!(week.dates.len(), 7);
    assert_eq!(week.workouts.len(), 7);
    assert!(week.workouts.values().all(|record| !record.completed));
}

#[tokio::test]
async fn http_prize_for_current_week() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let prize: PrizeDetails = client
        .get(format!("{}/prize", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(prize.name, "Pasta night");
    assert_eq!(prize.image, "/static/images/Prize_Pasta.gif");
}

#[tokio::test]
async fn http_save_message_keeps_completion() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let today = today();

    let before = fetch_workouts(&client, &server.base_url).await;
    let response = client
        .post(format!("{}/save_message", server.base_url))
        .json(&serde_json::json!({ "date": date_key(today), "message": "felt strong" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let after = fetch_workouts(&client, &server.base_url).await;
    assert_eq!(after.workouts[&today].message, "felt strong");
    assert_eq!(
        after.workouts[&today].completed,
        before.workouts[&today].completed
    );
}

#[tokio::test]
async fn http_index_renders_the_week() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(html.matches(r#"<div class="day-box"#).count(), 7);
    assert_eq!(html.matches("day-box current").count(), 1);
    assert!(html.contains(&format!(r#"data-date="{}""#, date_key(today()))));
}

#[tokio::test]
async fn widget_toggles_against_the_server() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let today = today();

    let mut widget = SyncController::new(HttpWorkoutApi::new(server.base_url.clone()), today);
    widget.load().await;
    assert_eq!(widget.state(), SyncState::Ready);
    assert_eq!(widget.day_boxes().len(), 7);
    let was_completed = widget.store().get(today).is_some_and(|r| r.completed);

    widget.set_message_input("from the widget");
    let outcome = widget.toggle_today().await;
    assert_eq!(outcome, Some(ReconciliationOutcome::Confirmed));

    let remote = fetch_workouts(&client, &server.base_url).await;
    assert_eq!(remote.workouts[&today].completed, !was_completed);
    assert_eq!(remote.workouts[&today].message, "from the widget");
    assert_eq!(widget.store().get(today), Some(&remote.workouts[&today]));

    widget.settle_chart().await;
    assert_eq!(
        widget.chart().displayed().completed,
        widget.completed_count() as f64
    );

    widget.set_message_input("");
    assert_eq!(
        widget.toggle_today().await,
        Some(ReconciliationOutcome::Confirmed)
    );
}

#[tokio::test]
async fn widget_degrades_when_server_is_unreachable() {
    let base_url = format!("http://127.0.0.1:{}", pick_free_port());
    let mut widget = SyncController::new(HttpWorkoutApi::new(base_url), today());
    widget.load().await;

    assert_eq!(widget.state(), SyncState::Ready);
    assert!(widget.store().is_empty());
    assert!(widget.day_boxes().is_empty());
    assert_eq!(widget.toggle_today().await, None);
    assert!(!widget.click_prize_box().await);
}
