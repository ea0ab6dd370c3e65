use eyre::Result;
use mado_extension::types::ChapterImageInfo;
use uuid::Uuid;

use crate::commands::Context;

/// Images of chapter `id`, with the module's error turned into a report.
pub async fn fetch_images(context: &Context, id: &str, module: Option<Uuid>) -> Result<Vec<ChapterImageInfo>> {
    let module = context.resolve(module, id)?;
    tracing::info!(module = module.name(), "fetching chapter images from {id}");

    let mut images: Vec<ChapterImageInfo> = Vec::new();
    if let Err(e) = module.get_chapter_image(id, &mut images).await {
        let report = eyre::eyre!("{e}");
        tracing::debug!(pushed = images.len(), "{}", e.into_debug());
        e.close()?;
        return Err(report);
    }

    Ok(images)
}

pub async fn handle_chapter_command(context: &Context, id: &str, module: Option<Uuid>, json: bool) -> Result<()> {
    let images = fetch_images(context, id, module).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&images)?);
        return Ok(());
    }

    println!("{} images", images.len());
    for image in &images {
        println!("  {}", image.id);
    }

    Ok(())
}
