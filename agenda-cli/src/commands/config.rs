use agenda_core::config::AgendaConfig;
use agenda_core::session::Session;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::context::AppContext;

pub fn run(ctx: &AppContext) -> Result<()> {
    let config_path = AgendaConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Session:    {}", Session::default_path()?.display());

    println!();
    println!("{}", "Settings".bold());
    println!("  API:        {}", ctx.config.api_url);
    println!("  View:       {}", ctx.config.default_view);
    println!("  Week start: {}", ctx.config.week_start.weekday());
    println!("  Timezone:   {}", ctx.timezone);
    println!("  Sort:       {}", if ctx.config.sort_by_start { "by start time" } else { "as received" });
    let status = match &ctx.session {
        None => "logged out".to_string(),
        Some(session) => match session.user() {
            Some(user) if session.is_admin() => format!("logged in as {} (admin)", user.username),
            Some(user) => format!("logged in as {}", user.username),
            None => "logged in".to_string(),
        },
    };
    println!("  Session:    {status}");

    Ok(())
}
