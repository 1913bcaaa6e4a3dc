// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use chrono::Utc;

use crate::model::AddTelemetry;

fn reading(ship_id: i64) -> AddTelemetry {
    AddTelemetry {
        ship_id,
        timestamp: Utc::now(),
        longitude: 9.18,
        latitude: 45.46,
        heading: 270.0,
        temperature: 18.5,
        voltage: 12.1,
        velocity: 4.2,
    }
}

async fn seed_user(store: &Store, username: &str) -> anyhow::Result<users::UserRecord> {
    store
        .users
        .create(username, "hash", "salt", Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("create user: {e}"))
}

#[tokio::test]
async fn usernames_are_unique() -> anyhow::Result<()> {
    let store = Store::new();
    seed_user(&store, "ada").await?;
    assert_eq!(
        store.users.create("ada", "h2", "s2", Utc::now()).await.err(),
        Some(ErrorCode::Conflict)
    );
    Ok(())
}

#[tokio::test]
async fn rename_rejects_taken_username() -> anyhow::Result<()> {
    let store = Store::new();
    let ada = seed_user(&store, "ada").await?;
    seed_user(&store, "grace").await?;

    assert_eq!(store.users.update_username(ada.id, "grace").await.err(), Some(ErrorCode::Conflict));
    // Renaming to your own current name is a no-op, not a conflict.
    assert!(store.users.update_username(ada.id, "ada").await.is_ok());
    Ok(())
}

#[tokio::test]
async fn imai_is_unique() -> anyhow::Result<()> {
    let store = Store::new();
    let ada = seed_user(&store, "ada").await?;
    store
        .ships
        .create(ada.id, 12_345_678, "Beagle", "#fff")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    assert_eq!(
        store.ships.create(ada.id, 12_345_678, "Clone", "#000").await.err(),
        Some(ErrorCode::Conflict)
    );
    Ok(())
}

#[tokio::test]
async fn find_owned_distinguishes_missing_from_foreign() -> anyhow::Result<()> {
    let store = Store::new();
    let ada = seed_user(&store, "ada").await?;
    let grace = seed_user(&store, "grace").await?;
    let ship = store
        .ships
        .create(ada.id, 12_345_678, "Beagle", "#fff")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    assert!(store.ships.find_owned(ship.id, ada.id).await.is_ok());
    assert_eq!(store.ships.find_owned(ship.id, grace.id).await.err(), Some(ErrorCode::NotOwner));
    assert_eq!(store.ships.find_owned(9999, ada.id).await.err(), Some(ErrorCode::NotFound));
    Ok(())
}

#[tokio::test]
async fn update_keeps_own_imai_but_rejects_foreign_imai() -> anyhow::Result<()> {
    let store = Store::new();
    let ada = seed_user(&store, "ada").await?;
    let beagle = store
        .ships
        .create(ada.id, 11_111_111, "Beagle", "#fff")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    store
        .ships
        .create(ada.id, 22_222_222, "Endeavour", "#000")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    // Same imai, new name: allowed.
    let renamed = store
        .ships
        .update(beagle.id, ada.id, 11_111_111, "Beagle II", "#fff")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    assert_eq!(renamed.name, "Beagle II");

    // Another ship's imai: conflict.
    assert_eq!(
        store.ships.update(beagle.id, ada.id, 22_222_222, "Beagle II", "#fff").await.err(),
        Some(ErrorCode::Conflict)
    );
    Ok(())
}

#[tokio::test]
async fn set_course_replaces_and_clears() -> anyhow::Result<()> {
    let store = Store::new();
    let ada = seed_user(&store, "ada").await?;
    let ship = store
        .ships
        .create(ada.id, 12_345_678, "Beagle", "#fff")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let set = store
        .ships
        .set_course(ship.id, ada.id, Some(vec![(0.0, 0.0), (1.0, 1.0)]))
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    assert_eq!(set.course.as_deref().map(<[_]>::len), Some(2));

    let cleared = store
        .ships
        .set_course(ship.id, ada.id, None)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    assert!(cleared.course.is_none());
    Ok(())
}

#[tokio::test]
async fn deleting_a_ship_cascades_telemetry() -> anyhow::Result<()> {
    let store = Store::new();
    let ada = seed_user(&store, "ada").await?;
    let ship = store
        .ships
        .create(ada.id, 12_345_678, "Beagle", "#fff")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    store.telemetry.create(&reading(ship.id)).await;
    store.telemetry.create(&reading(ship.id)).await;

    store.delete_ship(ship.id, ada.id).await.map_err(|e| anyhow::anyhow!("{e}"))?;
    assert!(store.ships.find(ship.id).await.is_none());
    assert!(store.telemetry.list_by_ship(ship.id).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_cascades_ships_and_telemetry() -> anyhow::Result<()> {
    let store = Store::new();
    let ada = seed_user(&store, "ada").await?;
    let grace = seed_user(&store, "grace").await?;
    let beagle = store
        .ships
        .create(ada.id, 11_111_111, "Beagle", "#fff")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let endeavour = store
        .ships
        .create(grace.id, 22_222_222, "Endeavour", "#000")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    store.telemetry.create(&reading(beagle.id)).await;
    store.telemetry.create(&reading(endeavour.id)).await;

    assert!(store.delete_user(ada.id).await.is_some());
    assert!(store.users.find(ada.id).await.is_none());
    assert!(store.ships.find(beagle.id).await.is_none());
    assert!(store.telemetry.list_by_ship(beagle.id).await.is_empty());

    // Other accounts are untouched.
    assert!(store.ships.find(endeavour.id).await.is_some());
    assert_eq!(store.telemetry.list_by_ship(endeavour.id).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn telemetry_listing_is_in_insertion_order() -> anyhow::Result<()> {
    let store = Store::new();
    let first = store.telemetry.create(&reading(7)).await;
    let second = store.telemetry.create(&reading(7)).await;
    store.telemetry.create(&reading(8)).await;

    let rows = store.telemetry.list_by_ship(7).await;
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![first.id, second.id]);
    Ok(())
}
