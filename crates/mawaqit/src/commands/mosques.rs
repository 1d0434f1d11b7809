//! `mawaqit mosques`: mosques around the configured point.

use tabled::Tabled;

use mawaqit_core::{MawaqitSource, MosqueIdentity, PrayerSource};

use crate::cli::MosquesArgs;
use crate::commands::Ctx;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct MosqueRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Location")]
    localisation: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "UUID")]
    uuid: String,
}

impl MosqueRow {
    fn new(m: &MosqueIdentity) -> Self {
        Self {
            name: m.name.clone(),
            slug: m.slug.clone().unwrap_or_default(),
            localisation: m.localisation.clone().unwrap_or_default(),
            distance: m.proximity.map(format_distance).unwrap_or_default(),
            uuid: m.uuid.clone(),
        }
    }
}

fn format_distance(metres: f64) -> String {
    if metres < 1000.0 {
        format!("{metres:.0} m")
    } else {
        format!("{:.1} km", metres / 1000.0)
    }
}

pub async fn handle(args: MosquesArgs, ctx: &Ctx<'_>) -> Result<(), CliError> {
    let (latitude, longitude) = ctx.cfg.location()?;
    let timezone = ctx.cfg.timezone()?;
    let client = ctx.cfg.build_client(Some(ctx.cfg.resolve_credentials()?))?;
    let source = MawaqitSource::new(client, timezone);

    let mosques = source
        .lookup_mosques(latitude, longitude, args.search.as_deref())
        .await?;
    tracing::debug!(count = mosques.len(), "mosques found");

    let rendered = output::render_list(
        ctx.format,
        &mosques,
        MosqueRow::new,
        |m| m.uuid.clone(),
    )?;
    ctx.print(&rendered);
    Ok(())
}
