use eyre::Result;
use uuid::Uuid;

use crate::commands::Context;

pub async fn handle_info_command(context: &Context, url: &str, module: Option<Uuid>, json: bool) -> Result<()> {
    let module = context.resolve(module, url)?;
    tracing::info!(module = module.name(), "fetching manga info from {url}");

    let info = match module.get_info(url).await {
        Ok(info) => info,
        Err(e) => {
            let report = eyre::eyre!("{e}");
            tracing::debug!("{}", e.into_debug());
            e.close()?;
            return Err(report);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let manga = &info.manga;
    println!("{}", manga.title);
    if !manga.authors.is_empty() {
        println!("Authors: {}", manga.authors.join(", "));
    }
    if !manga.artists.is_empty() {
        println!("Artists: {}", manga.artists.join(", "));
    }
    if !manga.genres.is_empty() {
        println!("Genres: {}", manga.genres.join(", "));
    }
    if let Some(cover) = &manga.cover_link {
        println!("Cover: {cover}");
    }
    if let Some(summary) = &manga.summary {
        println!("\n{summary}\n");
    }

    println!("{} chapters", info.chapters.len());
    for chapter in &info.chapters {
        println!("  {chapter}  {}", chapter.id);
    }

    Ok(())
}
