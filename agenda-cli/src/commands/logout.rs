use agenda_core::session::Session;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::context::AppContext;

pub fn run(ctx: &AppContext) -> Result<()> {
    match Session::load_from(&ctx.session_path)? {
        Some(session) => {
            session.logout(&ctx.session_path)?;
            println!("{}", "Logged out".green());
        }
        None => println!("{}", "Not logged in".dimmed()),
    }
    Ok(())
}
