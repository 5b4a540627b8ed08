use agenda_core::Granularity;
use anyhow::Result;

use crate::context::AppContext;
use crate::host::Host;
use crate::render::Render;
use crate::source::Source;

pub async fn run(ctx: &AppContext, source: Source, view: Option<Granularity>, date: Option<String>) -> Result<()> {
    let focus = super::resolve_focus(ctx, date.as_deref())?;
    let mut host = Host::new(ctx, source, view, focus);
    host.sync().await?;

    println!("{}", host.view().grid().render(&ctx.timezone));
    Ok(())
}
