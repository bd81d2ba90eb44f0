use crate::models::PrizeDetails;
use crate::widget::chart::{ChartFrame, GOAL};
use crate::widget::render::{
    escape_html, render_days, render_donut, render_fragment, render_prize_slot, PrizeSlot,
};
use crate::widget::store::WorkoutStore;
use chrono::NaiveDate;

/// Everything the index page shows for one request.
#[derive(Debug, Clone)]
pub struct IndexView {
    pub days_html: String,
    pub donut_svg: String,
    pub completed: usize,
    pub today_message: String,
    pub prize_slot: PrizeSlot,
}

impl IndexView {
    pub fn build(
        dates: &[NaiveDate],
        store: &WorkoutStore,
        today: NaiveDate,
        prize: Option<PrizeDetails>,
    ) -> Self {
        let completed = store.count_completed(dates);
        let prize_slot = match prize {
            Some(prize) if completed >= GOAL => PrizeSlot::Revealed(prize),
            _ => PrizeSlot::Placeholder,
        };

        Self {
            days_html: render_fragment(&render_days(dates, store, today)),
            donut_svg: render_donut(ChartFrame::settled(completed, GOAL)),
            completed,
            today_message: store
                .get(today)
                .map(|record| record.message.clone())
                .unwrap_or_default(),
            prize_slot,
        }
    }
}

pub fn render_index(view: &IndexView) -> String {
    let (prize_name, prize_description, prize_image) = match &view.prize_slot {
        PrizeSlot::Revealed(prize) => (
            escape_html(&prize.name),
            escape_html(&prize.description),
            escape_html(&prize.image),
        ),
        PrizeSlot::Placeholder => (String::new(), String::new(), String::new()),
    };

    let completed = view.completed.to_string();
    let goal = GOAL.to_string();
    let message = escape_html(&view.today_message);
    let prize_slot = render_prize_slot(&view.prize_slot);

    fill_template(INDEX_HTML, |key| match key {
        "DAYS" => Some(view.days_html.as_str()),
        "DONUT" => Some(view.donut_svg.as_str()),
        "COMPLETED" => Some(completed.as_str()),
        "GOAL" => Some(goal.as_str()),
        "MESSAGE" => Some(message.as_str()),
        "PRIZE_SLOT" => Some(prize_slot.as_str()),
        "PRIZE_NAME" => Some(prize_name.as_str()),
        "PRIZE_DESCRIPTION" => Some(prize_description.as_str()),
        "PRIZE_IMAGE" => Some(prize_image.as_str()),
        _ => None,
    })
}

/// Replaces each `{{KEY}}` of `template` in a single pass. Substituted values
/// are never scanned again, so notes containing braces come out literally.
fn fill_template<'a>(template: &str, value: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let filled = after
            .find("}}")
            .and_then(|end| value(&after[..end]).map(|filled| (end, filled)));
        match filled {
            Some((end, filled)) => {
                out.push_str(filled);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Workout Tracker</title>
  <style>
    :root {
      --ink: #2b2a28;
      --green: #4C6B4C;
      --pink: #F4D3D8;
      --card: rgba(255, 255, 255, 0.9);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, #fdf6f7, #f4d3d8 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 24px 16px;
    }

    .app {
      width: min(720px, 100%);
      background: var(--card);
      border-radius: 24px;
      padding: 28px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    .days-container {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 8px;
    }

    .day-box {
      position: relative;
      background: white;
      border-radius: 14px;
      padding: 10px 4px;
      text-align: center;
      cursor: pointer;
    }

    .day-box.current {
      outline: 2px solid var(--green);
    }

    .day-box .checkbox {
      width: 18px;
      height: 18px;
      margin: 6px auto 0;
      border-radius: 50%;
      border: 2px solid var(--green);
    }

    .day-box.checked .checkbox {
      background: var(--green);
    }

    .message-indicator {
      position: absolute;
      top: 6px;
      right: 6px;
      width: 6px;
      height: 6px;
      border-radius: 50%;
      background: var(--green);
    }

    .progress {
      display: flex;
      align-items: center;
      gap: 24px;
    }

    .donut {
      width: 140px;
      height: 140px;
    }

    .prize-box {
      font-size: 2.4rem;
      cursor: pointer;
    }

    .prize-box img {
      width: 72px;
    }

    form {
      display: grid;
      gap: 12px;
    }

    input[type="text"] {
      padding: 12px;
      border-radius: 12px;
      border: 1px solid rgba(0, 0, 0, 0.12);
      font-size: 1rem;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      background: var(--green);
      color: white;
      cursor: pointer;
    }

    .popup {
      position: fixed;
      inset: 0;
      background: rgba(0, 0, 0, 0.4);
      display: none;
      place-items: center;
    }

    .popup.active {
      display: grid;
    }

    .popup-content {
      background: white;
      border-radius: 18px;
      padding: 24px;
      max-width: 320px;
      text-align: center;
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>Workout Tracker</h1>

    <section class="days-container">{{DAYS}}</section>

    <section class="progress">
      {{DONUT}}
      <div>
        <strong id="completedWorkouts">{{COMPLETED}}</strong> / {{GOAL}} workouts
      </div>
      <div class="prize-box" id="prizeBox">{{PRIZE_SLOT}}</div>
    </section>

    <form id="toggle-form" method="post" action="/toggle">
      <input type="text" id="workoutMessage" name="message" value="{{MESSAGE}}" placeholder="How did it go?" />
      <button type="submit" id="workoutButton">Workout done</button>
    </form>
  </main>

  <div class="popup" id="prizePopup">
    <div class="popup-content">
      <img id="prizeImage" src="{{PRIZE_IMAGE}}" alt="" width="160" />
      <h2 id="prizeName">{{PRIZE_NAME}}</h2>
      <p id="prizeDescription">{{PRIZE_DESCRIPTION}}</p>
    </div>
  </div>

  <div class="popup" id="messagePopup">
    <div class="popup-content">
      <p id="messageText"></p>
    </div>
  </div>

  <script>
    const form = document.getElementById('toggle-form');
    const prizeBox = document.getElementById('prizeBox');
    const prizePopup = document.getElementById('prizePopup');
    const messagePopup = document.getElementById('messagePopup');
    const messageText = document.getElementById('messageText');

    document.querySelectorAll('.day-box').forEach((box) => {
      box.addEventListener('click', () => {
        if (box.classList.contains('current')) {
          form.requestSubmit();
        } else if (box.dataset.message) {
          messageText.textContent = box.dataset.message;
          messagePopup.classList.add('active');
        }
      });
    });

    prizeBox.addEventListener('click', () => {
      if (prizeBox.querySelector('img')) {
        prizePopup.classList.add('active');
      }
    });

    [prizePopup, messagePopup].forEach((popup) => {
      popup.addEventListener('click', (event) => {
        if (event.target === popup) {
          popup.classList.remove('active');
        }
      });
    });
  </script>
</body>
</html>
"#;
