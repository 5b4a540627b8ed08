use agenda_core::Granularity;
use anyhow::Result;

use crate::context::AppContext;
use crate::host::Host;
use crate::render::Render;
use crate::source::Source;

/// Show one event, looked up in the month around `date`.
pub async fn run(ctx: &AppContext, source: Source, id: i64, date: Option<String>) -> Result<()> {
    let focus = super::resolve_focus(ctx, date.as_deref())?;
    let mut host = Host::new(ctx, source, Some(Granularity::Month), focus);
    host.sync().await?;

    let tz = ctx.timezone;
    let view = host.view_mut();
    view.on_select(move |event| println!("{}", event.render(&tz)));

    if view.select_event(id).is_none() {
        anyhow::bail!(
            "Event {} not found in {}. Use --date to look in another month",
            id,
            view.visible_range()
        );
    }
    Ok(())
}
