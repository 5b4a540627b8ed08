use agenda_core::session::Session;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::context::AppContext;
use crate::source::HttpSource;
use crate::utils::tui::create_spinner;

pub async fn run(ctx: &AppContext, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => rpassword::prompt_password("Token: ").context("Could not read token")?,
    };

    let session = Session::login(token, None)?;

    let spinner = create_spinner("Fetching profile".to_string());
    let profile = HttpSource::new(&ctx.config.api_url, Some(session.clone()))
        .profile()
        .await;
    spinner.finish_and_clear();

    let session = match profile {
        Ok(user) => session.with_user(user),
        Err(e) => {
            tracing::warn!("could not fetch profile, storing token only: {e:#}");
            session
        }
    };
    session.save_to(&ctx.session_path)?;

    match session.user() {
        Some(user) if session.is_admin() => {
            println!("{} {} {}", "Logged in as".green(), user.username.bold(), "(admin)".dimmed())
        }
        Some(user) => println!("{} {}", "Logged in as".green(), user.username.bold()),
        None => println!("{}", "Logged in".green()),
    }
    match session.expires_at() {
        Some(exp) => println!(
            "   {} {}",
            "Expires:".dimmed(),
            exp.with_timezone(&ctx.timezone).format("%a %b %-d %Y, %H:%M")
        ),
        None => println!("   {}", "Token has no expiry".dimmed()),
    }
    Ok(())
}
