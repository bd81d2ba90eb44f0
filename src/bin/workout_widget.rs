use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use workout_tracker::calendar::{parse_date_key, today};
use workout_tracker::widget::render::{DayBox, PrizeSlot, PRIZE_PLACEHOLDER};
use workout_tracker::widget::{HttpWorkoutApi, ReconciliationOutcome, SyncController};

#[derive(Parser)]
#[command(name = "workout-widget")]
#[command(about = "Weekly workout tracker in the terminal", long_about = None)]
struct Cli {
    /// Base URL of the workout server
    #[arg(long, env = "WORKOUT_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current week
    Show,
    /// Mark today's workout done (or undo it)
    Toggle {
        /// Note stored with today's workout
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Show the note left on a day (YYYY-MM-DD)
    Message { date: String },
    /// Save a note for today without toggling
    Note { text: String },
    /// Reveal this week's prize once the goal is met
    Prize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();
    let api = HttpWorkoutApi::new(cli.server);
    let mut widget = SyncController::new(api, today());
    widget.load().await;

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => {}
        Command::Toggle { message } => {
            if let Some(message) = message {
                widget.set_message_input(message);
            }
            match widget.toggle_today().await {
                Some(ReconciliationOutcome::Confirmed) => println!("Saved."),
                Some(ReconciliationOutcome::RolledBack) => {
                    println!("Could not reach the server, nothing changed.")
                }
                None => println!("Today is not part of the visible week."),
            }
        }
        Command::Message { date } => {
            let Some(date) = parse_date_key(&date) else {
                return Err(format!("invalid date {date:?}, expected YYYY-MM-DD").into());
            };
            if widget.show_message(date) {
                if let Some(message) = widget.popups().message.content() {
                    println!("{date}: {message}");
                }
                widget.popups_mut().message.close();
            } else {
                println!("No note for {date}.");
            }
        }
        Command::Note { text } => {
            widget.set_message_input(text);
            if widget.save_message().await.is_ok() {
                println!("Note saved.");
            } else {
                println!("Could not save the note.");
            }
        }
        Command::Prize => {
            if widget.click_prize_box().await {
                if let Some(prize) = widget.popups().prize.content() {
                    println!("{}: {}", prize.name, prize.description);
                }
            } else {
                println!("Keep going, the prize unlocks at {} workouts.", widget.chart().goal());
            }
        }
    }

    widget.settle_chart().await;
    print_week(&widget);
    Ok(())
}

fn print_week<A: workout_tracker::widget::WorkoutApi>(widget: &SyncController<A>) {
    let line: Vec<String> = widget.day_boxes().iter().map(format_day).collect();
    println!("{}", line.join("  "));

    let frame = widget.chart().displayed();
    let goal = widget.chart().goal();
    let filled = frame.completed.round().clamp(0.0, goal as f64) as usize;
    println!(
        "{}{} {}/{}",
        "●".repeat(filled),
        "○".repeat(goal - filled),
        widget.chart().completed_label(),
        goal
    );

    match widget.prize_slot() {
        PrizeSlot::Revealed(prize) => println!("Prize: {}", prize.name),
        PrizeSlot::Placeholder => println!("Prize: {PRIZE_PLACEHOLDER}"),
    }
}

fn format_day(day: &DayBox) -> String {
    let mark = if day.checked { "x" } else { " " };
    let today = if day.is_current() { "*" } else { "" };
    let note = if day.message.is_some() { "✎" } else { "" };
    format!("[{mark}] {} {:>2}{today}{note}", day.date.weekday_label, day.date.day_of_month)
}
