use crate::calendar::{date_key, DisplayDate};
use crate::models::PrizeDetails;
use crate::widget::chart::ChartFrame;
use crate::widget::store::WorkoutStore;
use chrono::NaiveDate;
use std::f64::consts::PI;
use std::fmt::Write;

pub const PRIZE_PLACEHOLDER: &str = "❓";

const DONUT_RADIUS: f64 = 40.0;
const COMPLETED_COLOR: &str = "#4C6B4C";
const REMAINING_COLOR: &str = "#F4D3D8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBox {
    pub date: DisplayDate,
    pub checked: bool,
    /// Present only for a non-empty note.
    pub message: Option<String>,
}

impl DayBox {
    pub fn is_current(&self) -> bool {
        self.date.is_today
    }

    pub fn class_list(&self) -> String {
        let mut classes = String::from("day-box");
        if self.is_current() {
            classes.push_str(" current");
        }
        if self.checked {
            classes.push_str(" checked");
        }
        classes
    }
}

/// What the reward slot shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrizeSlot {
    #[default]
    Placeholder,
    Revealed(PrizeDetails),
}

pub fn render_days(range: &[NaiveDate], store: &WorkoutStore, today: NaiveDate) -> Vec<DayBox> {
    range
        .iter()
        .map(|date| {
            let record = store.get(*date);
            DayBox {
                date: DisplayDate::new(*date, today),
                checked: record.is_some_and(|record| record.completed),
                message: record
                    .filter(|record| record.has_message())
                    .map(|record| record.message.clone()),
            }
        })
        .collect()
}

pub fn render_fragment(boxes: &[DayBox]) -> String {
    let mut html = String::new();
    for day in boxes {
        let _ = write!(
            html,
            r#"<div class="{}" data-date="{}""#,
            day.class_list(),
            date_key(day.date.iso_date)
        );
        if let Some(message) = &day.message {
            let _ = write!(html, r#" data-message="{}""#, escape_html(message));
        }
        let _ = write!(
            html,
            r#"><div class="day-name">{}</div><div class="day-date">{}</div><div class="checkbox"></div>"#,
            day.date.weekday_label, day.date.day_of_month
        );
        if day.message.is_some() {
            html.push_str(r#"<div class="message-indicator"></div>"#);
        }
        html.push_str("</div>");
    }
    html
}

pub fn render_donut(frame: ChartFrame) -> String {
    let total = frame.completed + frame.remaining;
    let share = if total > 0.0 {
        (frame.completed / total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let circumference = 2.0 * PI * DONUT_RADIUS;
    let filled = circumference * share;

    format!(
        concat!(
            r#"<svg class="donut" viewBox="0 0 100 100" role="img" aria-label="{completed:.0} of {total:.0} workouts">"#,
            r#"<circle cx="50" cy="50" r="{r}" fill="none" stroke="{remaining_color}" stroke-width="12" />"#,
            r#"<circle cx="50" cy="50" r="{r}" fill="none" stroke="{completed_color}" stroke-width="12" "#,
            r#"stroke-dasharray="{filled:.3} {circumference:.3}" transform="rotate(-90 50 50)" />"#,
            "</svg>"
        ),
        completed = frame.completed,
        total = total,
        r = DONUT_RADIUS,
        remaining_color = REMAINING_COLOR,
        completed_color = COMPLETED_COLOR,
        filled = filled,
        circumference = circumference,
    )
}

pub fn render_prize_slot(slot: &PrizeSlot) -> String {
    match slot {
        PrizeSlot::Placeholder => PRIZE_PLACEHOLDER.to_string(),
        PrizeSlot::Revealed(prize) => format!(
            r#"<img src="{}" alt="{}">"#,
            escape_html(&prize.image),
            escape_html(&prize.name)
        ),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateWindow;
    use crate::models::WorkoutRecord;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn sample_store() -> WorkoutStore {
        let mut store = WorkoutStore::new();
        store.set(
            date(19),
            WorkoutRecord {
                completed: true,
                message: "Ran <5k> & stretched".into(),
            },
        );
        store.set(
            date(20),
            WorkoutRecord {
                completed: false,
                message: "   ".into(),
            },
        );
        store
    }

    #[test]
    fn boxes_mark_today_checked_and_messages() {
        let today = date(20);
        let boxes = render_days(&DateWindow::Week.dates(today), &sample_store(), today);

        assert_eq!(boxes.len(), 7);
        assert_eq!(boxes.iter().filter(|b| b.is_current()).count(), 1);
        assert_eq!(boxes[0].class_list(), "day-box checked");
        assert_eq!(boxes[0].message.as_deref(), Some("Ran <5k> & stretched"));
        assert_eq!(boxes[1].class_list(), "day-box current");
        assert_eq!(boxes[1].message, None);
    }

    #[test]
    fn fragment_is_escaped_and_stable() {
        let today = date(20);
        let store = sample_store();
        let range = DateWindow::Week.dates(today);

        let first = render_fragment(&render_days(&range, &store, today));
        let second = render_fragment(&render_days(&range, &store, today));
        assert_eq!(first, second);
        assert_eq!(first.matches(r#"<div class="day-box"#).count(), 7);
        assert!(first.contains(r#"data-message="Ran &lt;5k&gt; &amp; stretched""#));
        assert_eq!(first.matches("message-indicator").count(), 1);
        assert!(first.contains(r#"<div class="day-name">Mon</div><div class="day-date">19</div>"#));
    }

    #[test]
    fn donut_fills_in_proportion() {
        let empty = render_donut(ChartFrame::settled(0, 3));
        assert!(empty.contains(r#"stroke-dasharray="0.000 "#));

        let full = render_donut(ChartFrame::settled(3, 3));
        assert!(full.contains("3 of 3 workouts"));
        assert!(full.contains(r#"stroke-dasharray="251.327 251.327""#));
    }

    #[test]
    fn prize_slot_shows_placeholder_until_revealed() {
        assert_eq!(render_prize_slot(&PrizeSlot::Placeholder), PRIZE_PLACEHOLDER);
        let slot = PrizeSlot::Revealed(PrizeDetails {
            image: "/static/images/Prize.gif".into(),
            name: "Shake".into(),
            description: "Protein".into(),
        });
        assert_eq!(
            render_prize_slot(&slot),
            r#"<img src="/static/images/Prize.gif" alt="Shake">"#
        );
    }
}
