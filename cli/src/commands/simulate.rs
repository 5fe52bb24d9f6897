use std::{io::{self, Write}, sync::Arc};

use anyhow::{Context, Result};
use binroute::{
    Assignment, MemoryStore, PositionSample, ProximityNotifier, RecordingNotifier, ReplaySource, TrackerConfig,
    TrackingSession,
};
use tracing::info;

use super::read_documents;

pub async fn run(_cli: &crate::cli::Cli, args: &crate::cli::SimulateArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => TrackerConfig::from_json_file(path)?,
        None => TrackerConfig::default(),
    };

    let track: Vec<PositionSample> = read_documents(&args.track)?
        .into_iter()
        .enumerate()
        .map(|(i, doc)| serde_json::from_value(doc).with_context(|| format!("Invalid position sample at index {i}")))
        .collect::<Result<_>>()?;

    let store = Arc::new(MemoryStore::new());
    store.set_residents(&args.route, read_documents(&args.residents)?);

    let notifier = Arc::new(RecordingNotifier::new());
    let proximity = Arc::new(ProximityNotifier::new(store.clone(), notifier.clone(), config)?);

    let samples = track.len();
    let mut session = TrackingSession::new(Arc::new(ReplaySource::new(track)), store, proximity);
    session.start(Assignment::new(&args.driver, &args.driver, &args.route, &args.unit)).await?;
    session.drain().await;
    let snapshot = session.snapshot();
    session.stop().await?;

    let sent = notifier.sent();
    info!(samples, accepted = snapshot.accepted, alerts = sent.len(), route_id = %args.route, "simulation finished");

    let mut out = io::stdout().lock();
    for (_, event) in &sent {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }
    Ok(())
}
