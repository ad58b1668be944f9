// Window store shared across instances through Redis hashes

use crate::errors::Result;
use crate::rate_limit::fixed_window::now_millis;
use crate::rate_limit::store::{WindowEntry, WindowStore};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, Script};

const RATE_LIMIT_PREFIX: &str = "ratelimit:";

// Keys outlive their window slightly so a late `get` still sees the last count
const EXPIRY_GRACE_MS: u64 = 60 * 1000;

pub struct RedisWindowStore {
    manager: ConnectionManager,
    hit_script: Script,
}

impl RedisWindowStore {
    pub fn new(manager: ConnectionManager) -> Self {
        // Reset-or-increment in one round trip so concurrent instances agree
        let hit_script = Script::new(
            r#"
            local key = KEYS[1]
            local now = tonumber(ARGV[1])
            local window_ms = tonumber(ARGV[2])
            local grace_ms = tonumber(ARGV[3])

            local reset_at = tonumber(redis.call('HGET', key, 'reset_at'))

            if (not reset_at) or now > reset_at then
                reset_at = now + window_ms
                redis.call('HSET', key, 'count', 1, 'reset_at', reset_at)
                redis.call('PEXPIRE', key, window_ms + grace_ms)
                return {1, reset_at}
            end

            local count = redis.call('HINCRBY', key, 'count', 1)
            return {count, reset_at}
            "#,
        );

        Self {
            manager,
            hit_script,
        }
    }

    fn redis_key(key: &str) -> String {
        format!("{}{}", RATE_LIMIT_PREFIX, key)
    }
}

/// Milliseconds until a window ending at `reset_at` may be dropped, never zero
fn expiry_ttl_ms(reset_at: u64, now: u64) -> u64 {
    reset_at
        .saturating_add(EXPIRY_GRACE_MS)
        .saturating_sub(now)
        .max(1)
}

#[async_trait]
impl WindowStore for RedisWindowStore {
    async fn get(&self, key: &str) -> Result<Option<WindowEntry>> {
        let mut conn = self.manager.clone();

        let (count, reset_at): (Option<u64>, Option<u64>) = redis::cmd("HMGET")
            .arg(Self::redis_key(key))
            .arg("count")
            .arg("reset_at")
            .query_async(&mut conn)
            .await?;

        Ok(match (count, reset_at) {
            (Some(count), Some(reset_at)) => Some(WindowEntry { count, reset_at }),
            _ => None,
        })
    }

    async fn set(&self, key: &str, entry: WindowEntry) -> Result<()> {
        let mut conn = self.manager.clone();
        let redis_key = Self::redis_key(key);
        // Relative TTL; an absolute expiry before now would drop the key at once
        let ttl_ms = expiry_ttl_ms(entry.reset_at, now_millis());

        redis::pipe()
            .atomic()
            .cmd("HSET")
            .arg(&redis_key)
            .arg("count")
            .arg(entry.count)
            .arg("reset_at")
            .arg(entry.reset_at)
            .ignore()
            .cmd("PEXPIRE")
            .arg(&redis_key)
            .arg(ttl_ms)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn hit(&self, key: &str, now: u64, window_ms: u64) -> Result<WindowEntry> {
        let mut conn = self.manager.clone();

        let result: Vec<u64> = self
            .hit_script
            .key(Self::redis_key(key))
            .arg(now)
            .arg(window_ms)
            .arg(EXPIRY_GRACE_MS)
            .invoke_async(&mut conn)
            .await?;

        Ok(WindowEntry {
            count: result.first().copied().unwrap_or(1),
            reset_at: result
                .get(1)
                .copied()
                .unwrap_or_else(|| now.saturating_add(window_ms)),
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();

        redis::cmd("DEL")
            .arg(Self::redis_key(key))
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn sweep(&self, _now: u64) -> Result<usize> {
        // Redis expires keys on its own
        tracing::debug!("Skipping sweep for redis window store");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedisConfig;

    async fn store() -> RedisWindowStore {
        let manager = crate::redis::create_client(&RedisConfig::default())
            .await
            .unwrap();
        RedisWindowStore::new(manager)
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_hit_counts_within_window() {
        let store = store().await;
        let key = "test:fixed_window:count";
        store.remove(key).await.unwrap();

        let first = store.hit(key, 1_000, 60_000).await.unwrap();
        assert_eq!(first, WindowEntry { count: 1, reset_at: 61_000 });

        let second = store.hit(key, 2_000, 60_000).await.unwrap();
        assert_eq!(second.count, 2);
        assert_eq!(second.reset_at, 61_000);

        store.remove(key).await.unwrap();
    }

    #[test]
    fn test_expiry_ttl_includes_grace() {
        assert_eq!(expiry_ttl_ms(61_000, 1_000), 60_000 + EXPIRY_GRACE_MS);
        // Window already over, still inside the grace period
        assert_eq!(expiry_ttl_ms(1_000, 2_000), EXPIRY_GRACE_MS - 1_000);
    }

    #[test]
    fn test_expiry_ttl_is_never_zero() {
        assert_eq!(expiry_ttl_ms(1_000, 1_000 + EXPIRY_GRACE_MS), 1);
        assert_eq!(expiry_ttl_ms(1_000, u64::MAX), 1);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_hit_after_reset_instant_starts_fresh() {
        let store = store().await;
        let key = "test:fixed_window:expiry";
        store.remove(key).await.unwrap();

        let now = now_millis();
        store
            .set(key, WindowEntry { count: 9, reset_at: now - 1 })
            .await
            .unwrap();
        assert_eq!(store.get(key).await.unwrap().unwrap().count, 9);

        let renewed = store.hit(key, now, 500).await.unwrap();
        assert_eq!(renewed, WindowEntry { count: 1, reset_at: now + 500 });

        store.remove(key).await.unwrap();
        assert!(store.get(key).await.unwrap().is_none());
    }
}
