use std::{fs::File, io::{self, BufWriter, Write}};

use anyhow::{Context, Result};
use binroute::{plan_routes, MemoryStore, ScoringParams};
use tracing::info;

use super::read_documents;

pub async fn run(_cli: &crate::cli::Cli, args: &crate::cli::ClusterArgs) -> Result<()> {
    let params = match &args.params {
        Some(path) => ScoringParams::from_json_file(path)?,
        None => ScoringParams::default(),
    };

    let store = MemoryStore::new();
    let documents = read_documents(&args.addresses)?;
    info!(documents = documents.len(), path = %args.addresses.display(), "loaded addresses");
    for doc in documents { store.add_address(doc) }

    let routes = plan_routes(&store, args.threshold, args.criterion, &params).await?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, &routes)?;
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = &args.output {
        info!(routes = routes.len(), path = %path.display(), "wrote route plan");
    }
    Ok(())
}
