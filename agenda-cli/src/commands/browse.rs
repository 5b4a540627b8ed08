use agenda_core::{Direction, Granularity};
use anyhow::Result;
use chrono::Weekday;
use dialoguer::Input;
use owo_colors::OwoColorize;

use crate::context::AppContext;
use crate::host::Host;
use crate::render::Render;
use crate::source::Source;

const HELP: &str = "n next · p previous · m/w/d view · t today · j DATE jump · o DATE day · s ID event · ws DAY week start · q quit";

#[derive(Debug, PartialEq)]
enum Action {
    Advance(Direction),
    View(Granularity),
    Today,
    Jump(String),
    OpenDay(String),
    Select(i64),
    WeekStart(Weekday),
    Help,
    Quit,
}

fn parse_action(input: &str) -> Option<Action> {
    let input = input.trim();
    let (cmd, arg) = match input.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (input, ""),
    };

    match (cmd, arg) {
        ("n" | "next", "") => Some(Action::Advance(Direction::Next)),
        ("p" | "prev" | "previous", "") => Some(Action::Advance(Direction::Previous)),
        ("m" | "w" | "d" | "month" | "week" | "day", "") => cmd.parse().ok().map(Action::View),
        ("t" | "today", "") => Some(Action::Today),
        ("j" | "jump", date) if !date.is_empty() => Some(Action::Jump(date.to_string())),
        ("o" | "open", date) if !date.is_empty() => Some(Action::OpenDay(date.to_string())),
        ("s" | "select", id) => id.parse().ok().map(Action::Select),
        ("ws" | "week-start", day) => day.parse().ok().map(Action::WeekStart),
        ("?" | "h" | "help", "") => Some(Action::Help),
        ("q" | "quit" | "exit", "") => Some(Action::Quit),
        _ => None,
    }
}

pub async fn run(ctx: &AppContext, source: Source, view: Option<Granularity>, date: Option<String>) -> Result<()> {
    let focus = super::resolve_focus(ctx, date.as_deref())?;
    let mut host = Host::new(ctx, source, view, focus);

    let tz = ctx.timezone;
    host.view_mut()
        .on_select(move |event| println!("\n{}\n", event.render(&tz)));

    let mut redraw = true;
    loop {
        if let Err(e) = host.sync().await {
            println!("{}", e.to_string().red());
        }
        if redraw {
            println!("\n{}\n", host.view().grid().render(&tz));
            println!("{}", HELP.dimmed());
        }
        redraw = true;

        let line: String = Input::new()
            .with_prompt(host.view().granularity().to_string())
            .allow_empty(true)
            .interact_text()?;

        let Some(action) = parse_action(&line) else {
            if !line.trim().is_empty() {
                println!("{}", format!("Unknown command '{}'", line.trim()).red());
            }
            redraw = false;
            continue;
        };

        let view = host.view_mut();
        match action {
            Action::Advance(direction) => view.advance(direction),
            Action::View(granularity) => view.set_granularity(granularity),
            Action::Today => {
                view.jump_to(&ctx.today().to_string());
            }
            Action::Jump(date) => {
                if !view.jump_to(&date) {
                    println!("{}", format!("Not a date: {date}").red());
                    redraw = false;
                }
            }
            Action::OpenDay(date) => {
                match agenda_core::navigation::parse_jump_date(&date, &tz) {
                    Some(day) => println!("\n{}\n", view.day_detail(day).render(&tz)),
                    None => println!("{}", format!("Not a date: {date}").red()),
                }
                redraw = false;
            }
            Action::Select(id) => {
                if view.select_event(id).is_none() {
                    println!("{}", format!("No event #{id} in view").red());
                }
                redraw = false;
            }
            Action::WeekStart(day) => view.set_week_start(day),
            Action::Help => {
                println!("{}", HELP);
                redraw = false;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}
