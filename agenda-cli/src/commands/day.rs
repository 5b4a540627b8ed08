use agenda_core::Granularity;
use anyhow::Result;

use crate::context::AppContext;
use crate::host::Host;
use crate::render::Render;
use crate::source::Source;

pub async fn run(ctx: &AppContext, source: Source, date: String) -> Result<()> {
    let focus = super::resolve_focus(ctx, Some(&date))?;
    let mut host = Host::new(ctx, source, Some(Granularity::Day), focus);
    host.sync().await?;

    println!("{}", host.view().day_detail(focus).render(&ctx.timezone));
    Ok(())
}
