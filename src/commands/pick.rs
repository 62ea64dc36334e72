//! Scripted picker session.
//!
//! Plays a list of user actions against one engine wired to the global
//! dismissal registry, printing every value the engine emits.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use datepick_core::bridge::{DismissHandle, PopupBridge};
use datepick_core::config::PickerConfig;
use datepick_core::registry::DismissalRegistry;
use datepick_core::{ComposedValue, DatePickerEngine, TimeOfDay};
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use crate::render::Render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Year(i32),
    Month(u32),
    Day(u32),
    Time(TimeOfDay),
    Select(u32),
    Today,
    Toggle,
    Enter,
    /// A click outside every open picker.
    Outside,
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, arg) = match s.split_once('=') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let action = match name {
            "year" => Action::Year(required(name, arg)?.parse().context("Invalid year")?),
            "month" => Action::Month(required(name, arg)?.parse().context("Invalid month")?),
            "day" => Action::Day(required(name, arg)?.parse().context("Invalid day")?),
            "select" => Action::Select(required(name, arg)?.parse().context("Invalid day")?),
            "time" => Action::Time(required(name, arg)?.parse()?),
            "today" => Action::Today,
            "toggle" => Action::Toggle,
            "enter" => Action::Enter,
            "outside" => Action::Outside,
            other => anyhow::bail!("Unknown action '{}'", other),
        };

        Ok(action)
    }
}

pub async fn run(cfg: &PickerConfig, date: Option<&str>, actions: &[String]) -> Result<()> {
    let actions = actions
        .iter()
        .map(|a| a.parse::<Action>())
        .collect::<Result<Vec<_>>>()?;

    let external = date
        .map(|s| ComposedValue::parse(s, cfg.mode))
        .transpose()?;

    let registry = DismissalRegistry::global();
    let bridge: Arc<dyn PopupBridge> = Arc::new(registry);
    let (changes_tx, mut changes) = mpsc::unbounded_channel::<ComposedValue>();
    let (dismiss_handle, mut dismissals) = DismissHandle::channel();

    let mut engine = DatePickerEngine::from_config(cfg)
        .with_listener(changes_tx)
        .with_bridge(bridge)
        .with_dismiss_handle(dismiss_handle);

    engine.initialize(external);
    print_changes("init", &mut changes);

    for action in &actions {
        apply(&mut engine, action, registry);

        while let Ok(identity) = dismissals.try_recv() {
            engine.dismissed(identity);
        }

        print_changes(&describe(action), &mut changes);
    }

    println!();
    println!("{}", engine.render());

    // Dropping the engine closes the change channel
    drop(engine);
    while let Some(value) = changes.recv().await {
        println!("  {} {}", "late".dimmed(), value.render());
    }

    Ok(())
}

fn required<'a>(name: &str, arg: Option<&'a str>) -> Result<&'a str> {
    arg.ok_or_else(|| anyhow!("Action '{}' needs a value, e.g. {}=5", name, name))
}

fn apply(engine: &mut DatePickerEngine, action: &Action, registry: &DismissalRegistry) {
    match action {
        Action::Year(year) => {
            engine.set_year(*year);
        }
        Action::Month(month) => {
            engine.set_month(*month);
        }
        Action::Day(day) => {
            engine.set_day(*day);
        }
        Action::Time(time) => {
            engine.set_time(*time);
        }
        Action::Select(day) => engine.select_day(*day),
        Action::Today => engine.set_to_today(),
        Action::Toggle => engine.toggle(),
        Action::Enter => {
            engine.key_press("Enter");
        }
        Action::Outside => {
            registry.dismiss_all();
        }
    }
}

fn describe(action: &Action) -> String {
    match action {
        Action::Year(v) => format!("year={}", v),
        Action::Month(v) => format!("month={}", v),
        Action::Day(v) => format!("day={}", v),
        Action::Time(t) => format!("time={}", t),
        Action::Select(v) => format!("select={}", v),
        Action::Today => "today".to_string(),
        Action::Toggle => "toggle".to_string(),
        Action::Enter => "enter".to_string(),
        Action::Outside => "outside".to_string(),
    }
}

fn print_changes(label: &str, changes: &mut mpsc::UnboundedReceiver<ComposedValue>) {
    let mut any = false;
    while let Ok(value) = changes.try_recv() {
        println!("{:<12} {}", label.bold(), value.render());
        any = true;
    }
    if !any {
        println!("{:<12} {}", label.bold(), "(no change)".dimmed());
    }
}
