use crate::types::{CardSide, FlipCardError, Result};
use std::path::Path;

/// Load card sides from a CSV file with a header row (columns: text, imageUrl)
pub async fn load_sides_from_csv(path: impl AsRef<Path>) -> Result<Vec<CardSide>> {
    let path = path.as_ref().to_owned();

    let contents = tokio::fs::read_to_string(&path).await?;

    let sides = tokio::task::spawn_blocking(move || {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(contents.as_bytes());
        let mut sides = Vec::new();

        for result in reader.records() {
            let record = result?;
            let text = record.get(0).unwrap_or_default().trim();
            let image_url = record.get(1).unwrap_or_default().trim();
            sides.push(CardSide::new(text, image_url));
        }
        Ok::<_, FlipCardError>(sides)
    })
    .await??;

    Ok(sides)
}
