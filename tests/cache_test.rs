mod common;

use common::{GatedLoader, client_config, stripe_for, wait_until};
use std::sync::Arc;

#[tokio::test]
async fn test_cached_handle_short_circuits_loader() {
    let loader = Arc::new(GatedLoader::open());
    let stripe = stripe_for(&loader, client_config(Some("pk_test123"), false));

    let first = stripe.load().await.unwrap();
    let second = stripe.load().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn test_clones_share_cached_handle() {
    let loader = Arc::new(GatedLoader::open());
    let stripe = stripe_for(&loader, client_config(Some("pk_test123"), false));
    let consumer = stripe.clone();

    let handle = stripe.load().await.unwrap();

    assert!(Arc::ptr_eq(&consumer.handle().unwrap(), &handle));
    assert!(Arc::ptr_eq(&consumer.load().await.unwrap(), &handle));
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn test_manual_mode_never_caches() {
    let loader = Arc::new(GatedLoader::open());
    let stripe = stripe_for(&loader, client_config(Some("pk_test123"), true));

    let first = stripe.load().await.unwrap();
    let second = stripe.load().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(stripe.handle().is_none());
    assert_eq!(loader.calls(), 2);
}

#[tokio::test]
async fn test_manual_mode_skips_activation() {
    let loader = Arc::new(GatedLoader::open());
    let stripe = stripe_for(&loader, client_config(Some("pk_test123"), true));

    stripe.on_mounted().await;

    assert_eq!(loader.calls(), 0);
    assert!(!stripe.is_loading());
    assert!(stripe.handle().is_none());
}

#[tokio::test]
async fn test_activation_loads_once() {
    let loader = Arc::new(GatedLoader::open());
    let stripe = stripe_for(&loader, client_config(Some("pk_test123"), false));

    stripe.on_mounted().await;
    stripe.clone().on_mounted().await;

    assert_eq!(loader.calls(), 1);
    assert_eq!(stripe.handle().unwrap().key, "pk_test123");
}

#[tokio::test]
async fn test_activation_does_not_wait_for_in_flight_load() {
    let loader = Arc::new(GatedLoader::gated());
    let stripe = stripe_for(&loader, client_config(Some("pk_test123"), false));

    let pending = tokio::spawn({
        let stripe = stripe.clone();
        async move { stripe.load().await }
    });
    wait_until(|| loader.calls() == 1).await;

    stripe.on_mounted().await;
    assert!(stripe.is_loading());
    assert_eq!(loader.calls(), 1);

    loader.release();
    assert!(pending.await.unwrap().is_some());
    assert!(stripe.handle().is_some());
}

#[tokio::test]
async fn test_empty_load_is_shared_but_not_cached() {
    let loader = Arc::new(GatedLoader::gated().yielding_nothing());
    let stripe = stripe_for(&loader, client_config(Some("pk_test123"), false));

    let release = async {
        wait_until(|| loader.calls() == 1).await;
        loader.release();
    };
    let ((), a, b) = tokio::join!(release, stripe.load(), stripe.load());

    assert!(a.is_none() && b.is_none());
    assert_eq!(loader.calls(), 1);
    assert!(!stripe.is_loading());
    assert!(stripe.handle().is_none());

    let release = async {
        wait_until(|| loader.calls() == 2).await;
        loader.release();
    };
    let ((), c) = tokio::join!(release, stripe.load());

    assert!(c.is_none());
    assert_eq!(loader.calls(), 2);
    assert!(stripe.handle().is_none());
}
