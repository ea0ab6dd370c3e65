use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use tokio::fs;
use uuid::Uuid;

use crate::commands::Context;
use crate::commands::chapter::fetch_images;

pub async fn handle_download_command(
    context: &Context,
    id: &str,
    module_id: Option<Uuid>,
    output: &Path,
) -> Result<()> {
    let images = fetch_images(context, id, module_id).await?;
    let module = context.resolve(module_id, id)?;

    fs::create_dir_all(output)
        .await
        .wrap_err_with(|| format!("failed to create {}", output.display()))?;

    let width = images.len().to_string().len().max(3);
    for (index, image) in images.iter().enumerate() {
        let request = match module.download_image(image).await {
            Ok(request) => request,
            Err(e) => {
                let report = eyre::eyre!("{e}");
                e.close()?;
                return Err(report);
            }
        };

        let bytes = context.host.download(request).await?;
        let name = image
            .name
            .clone()
            .unwrap_or_else(|| format!("{:0width$}", index + 1));
        let path: PathBuf = output.join(format!("{name}.{}", image.extension));

        fs::write(&path, &bytes)
            .await
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        tracing::info!(bytes = bytes.len(), "saved {}", path.display());
    }

    println!("Downloaded {} images to {}", images.len(), output.display());
    Ok(())
}
