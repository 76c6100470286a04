//! End-to-end tests for the memory service over the RocksDB-backed store.

use anyhow::Result;
use oja::memory::{EpisodeState, Heuristic, MemoryService, Preference};
use oja::store::StoreConfig;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

fn open_service(dir: &TempDir) -> Result<MemoryService> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();

    Ok(MemoryService::open(StoreConfig::for_testing(dir.path()))?)
}

#[tokio::test]
async fn episode_creation_and_retrieval() -> Result<()> {
    let dir = TempDir::new()?;
    let service = open_service(&dir)?;

    let ep = service
        .create_episode("Monitors", "Looking for a 27 inch monitor")
        .await?;
    assert_eq!(ep.status.state, EpisodeState::Active);
    assert_eq!(ep.category, "Monitors");

    let active = service.get_active_episode(None).await?.unwrap();
    assert_eq!(active.id, ep.id);

    service.close().await?;
    Ok(())
}

#[tokio::test]
async fn episode_transition_logic() -> Result<()> {
    let dir = TempDir::new()?;
    let service = open_service(&dir)?;

    // Phase 1: start a Monitors episode
    let ep1 = service
        .create_episode("Monitors", "Looking for a 27 inch monitor")
        .await?;

    // Phase 2: drift to Inverters
    let ep2 = service
        .create_episode("Inverters", "How much for a 3kVA inverter?")
        .await?;

    let active = service.get_active_episode(None).await?.unwrap();
    assert_eq!(active.id, ep2.id);
    assert_eq!(active.category, "Inverters");

    let parked = service.get_episode_by_id(ep1.id).await?.unwrap();
    assert_eq!(parked.status.state, EpisodeState::Paused);
    assert_eq!(
        parked.status.last_transition_reason.as_deref(),
        Some("New episode started")
    );

    service.close().await?;
    Ok(())
}

#[tokio::test]
async fn preference_upsert_logic() -> Result<()> {
    let dir = TempDir::new()?;
    let service = open_service(&dir)?;

    let pref = Preference::new("Monitors", "brand", "LG");

    service.upsert_preference(&pref).await?;
    let initial = service.get_preferences("Monitors").await?;
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].evidence_count, 1);
    assert_eq!(initial[0].confidence, 0.5);

    // Reinforcement: same composite key, one record, stronger confidence
    service.upsert_preference(&pref).await?;
    let updated = service.get_preferences("Monitors").await?;
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].evidence_count, 2);
    assert!((updated[0].confidence - 0.55).abs() < 1e-12);

    service.close().await?;
    Ok(())
}

#[tokio::test]
async fn repeated_reinforcement_converges_below_one() -> Result<()> {
    let dir = TempDir::new()?;
    let service = open_service(&dir)?;

    let pref = Preference::new("Monitors", "refresh_rate", 144);

    let mut last = 0.0;
    for round in 1u32..=30 {
        let stored = service.upsert_preference(&pref).await?;
        assert_eq!(stored.evidence_count, round);
        assert!(stored.confidence > last);
        assert!(stored.confidence <= 1.0);
        last = stored.confidence;
    }

    let records = service.get_preferences("Monitors").await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].evidence_count, 30);

    service.close().await?;
    Ok(())
}

#[tokio::test]
async fn heuristic_storage_and_retrieval() -> Result<()> {
    let dir = TempDir::new()?;
    let service = open_service(&dir)?;

    let h = Heuristic::for_category(
        "Lagos Delivery Premium",
        "Lagos vendors usually have 24hr delivery but higher base price",
        "electronics",
        "Factor in delivery speed when comparing Lagos vs Abuja vendors",
    );
    service.add_heuristic(&h).await?;

    let results = service.get_heuristics("electronics").await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Lagos Delivery Premium");

    let empty = service.get_heuristics("furniture").await?;
    assert!(empty.is_empty());

    service.close().await?;
    Ok(())
}

#[tokio::test]
async fn memory_survives_reopen() -> Result<()> {
    let dir = TempDir::new()?;

    let episode_id = {
        let service = open_service(&dir)?;

        let ep = service
            .create_episode("Monitors", "Looking for a 27 inch monitor")
            .await?;
        service
            .upsert_preference(&Preference::new("Monitors", "brand", "LG"))
            .await?;

        service.close().await?;
        ep.id
    };

    let service = open_service(&dir)?;

    let restored = service.get_episode_by_id(episode_id).await?.unwrap();
    assert_eq!(restored.category, "Monitors");
    assert_eq!(restored.initial_query, "Looking for a 27 inch monitor");
    assert_eq!(restored.status.state, EpisodeState::Active);

    let prefs = service.get_preferences("Monitors").await?;
    assert_eq!(prefs.len(), 1);
    assert_eq!(prefs[0].evidence_count, 1);

    service.close().await?;
    Ok(())
}

#[tokio::test]
async fn caller_driven_completion() -> Result<()> {
    let dir = TempDir::new()?;
    let service = open_service(&dir)?;

    let mut ep = service
        .create_episode("Monitors", "Looking for a 27 inch monitor")
        .await?;
    ep.set_constraint("budget", 250_000);
    ep.record_product(42);
    ep.complete(Some("Purchase made"));
    service.update_episode(&mut ep).await?;

    // The terminal episode no longer occupies the active slot
    assert!(service.get_active_episode(None).await?.is_none());

    let stored = service.get_episode_by_id(ep.id).await?.unwrap();
    assert_eq!(stored.status.state, EpisodeState::Completed);
    assert_eq!(stored.product_ids, vec![42]);
    assert!(stored.updated_at >= stored.created_at);

    service.close().await?;
    Ok(())
}
