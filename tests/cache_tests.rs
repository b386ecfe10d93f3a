// Cache-aside layer tests: hit/miss, error propagation, expiry, key identity

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use usage_server::cache::{self, CacheStore, MemoryCache, usage_cache_key};
use usage_server::window::{self, Preset};

#[tokio::test]
async fn get_or_fetch_invokes_compute_exactly_once_per_key() {
    let store = MemoryCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = calls.clone();
        let value: u32 = cache::get_or_fetch(&store, "k", 60_000, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn compute_failure_caches_nothing_and_retries() {
    let store = MemoryCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let calls_first = calls.clone();
    let first: anyhow::Result<u32> = cache::get_or_fetch(&store, "k", 60_000, || async move {
        calls_first.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("upstream down")
    })
    .await;
    assert!(first.is_err());

    let calls_second = calls.clone();
    let second: u32 = cache::get_or_fetch(&store, "k", 60_000, || async move {
        calls_second.fetch_add(1, Ordering::SeqCst);
        Ok(42)
    })
    .await
    .unwrap();
    assert_eq!(second, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expired_entries_are_recomputed() {
    let store = MemoryCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = calls.clone();
        let _: u32 = cache::get_or_fetch(&store, "k", 30, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        })
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn distinct_keys_compute_independently() {
    let store = MemoryCache::new();
    let a: u32 = cache::get_or_fetch(&store, "a", 60_000, || async { Ok(1) })
        .await
        .unwrap();
    let b: u32 = cache::get_or_fetch(&store, "b", 60_000, || async { Ok(2) })
        .await
        .unwrap();
    assert_eq!((a, b), (1, 2));
}

#[tokio::test]
async fn memory_cache_get_returns_none_for_missing_key() {
    let store = MemoryCache::new();
    assert_eq!(store.get("missing").await.unwrap(), None);
    store.set("k", "v".to_string(), 60_000).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}

#[test]
fn usage_cache_key_ignores_group_ordering() {
    let now = chrono::Utc::now();
    let preset = Preset::parse("30d");
    let w = window::resolve_at(preset, now);
    let ab = usage_cache_key(&["a".into(), "b".into()], preset, &w, false);
    let ba = usage_cache_key(&["b".into(), "a".into()], preset, &w, false);
    assert_eq!(ab, ba);
}

#[test]
fn usage_cache_key_distinguishes_requests() {
    let now = chrono::Utc::now();
    let groups = vec!["a".to_string()];
    let thirty = Preset::parse("30d");
    let seven = Preset::parse("7d");
    let w30 = window::resolve_at(thirty, now);
    let w7 = window::resolve_at(seven, now);
    let base = usage_cache_key(&groups, thirty, &w30, false);
    assert_ne!(base, usage_cache_key(&groups, seven, &w7, false));
    assert_ne!(base, usage_cache_key(&groups, thirty, &w30, true));
    assert_ne!(
        base,
        usage_cache_key(&["other".into()], thirty, &w30, false)
    );
}
