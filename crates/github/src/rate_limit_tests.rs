use super::*;

#[test]
fn test_zero_rate_is_rejected() {
    assert!(matches!(
        RateLimiter::new(0, 5),
        Err(GatewayError::Configuration { .. })
    ));
    assert!(RateLimiter::new(5, 0).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_burst_is_served_immediately() {
    let limiter = RateLimiter::new(1, 3).expect("limiter");
    let cancel = CancellationToken::new();
    let start = Instant::now();

    for _ in 0..3 {
        limiter.acquire(&cancel).await.expect("token");
    }

    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_empty_bucket_waits_for_refill() {
    let limiter = RateLimiter::new(2, 1).expect("limiter");
    let cancel = CancellationToken::new();
    let start = Instant::now();

    limiter.acquire(&cancel).await.expect("first");
    limiter.acquire(&cancel).await.expect("second");
    limiter.acquire(&cancel).await.expect("third");

    assert!(start.elapsed() >= Duration::from_millis(1000));
    assert!(start.elapsed() < Duration::from_millis(1100));
}

#[tokio::test(start_paused = true)]
async fn test_clones_share_one_bucket() {
    let limiter = RateLimiter::new(1, 1).expect("limiter");
    let other = limiter.clone();
    let cancel = CancellationToken::new();
    let start = Instant::now();

    limiter.acquire(&cancel).await.expect("first");
    other.acquire(&cancel).await.expect("second");

    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_wait_fails() {
    let limiter = RateLimiter::new(1, 1).expect("limiter");
    let cancel = CancellationToken::new();
    limiter.acquire(&cancel).await.expect("first");

    cancel.cancel();
    let result = limiter.acquire(&cancel).await;

    assert!(matches!(result, Err(GatewayError::Cancelled)));
}
