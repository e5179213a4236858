//! Redis-backed [`ListStore`] adapter.
//!
//! The production counterpart of `lobby_core::DeterministicListStore`: each
//! contract primitive maps to one native Redis command, so it inherits
//! exactly the store's single-command atomicity: `RPUSH`/`LPOP`/`LPUSH`/
//! `LRANGE`/`LSET`/`LREM` for lists, `GET`/`SET`/`DEL`/`EXISTS`/`MGET` for
//! scalars. Compare-and-swap has no native command and runs as a small Lua
//! script, which Redis evaluates as a single atomic step (create-if-absent
//! is plain `SET NX`).
//!
//! Every call is bounded by a response timeout so callers fail fast instead
//! of hanging on a degraded server.

use std::time::Duration;

use async_trait::async_trait;
use lobby_core::ListStore;
use lobby_core::StoreError;
use redis::FromRedisValue;
use redis::Script;
use redis::aio::ConnectionManager;
use tracing::debug;

/// Default per-command response timeout in milliseconds.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 5_000;

/// Guarded-set script: swap only when the current value matches ARGV[1].
///
/// `GET` on a missing key yields lua `false`, which never equals a string,
/// so a vanished key fails the guard instead of matching.
const CAS_SCRIPT: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
  redis.call('SET', KEYS[1], ARGV[2])
  return 1
else
  return 0
end
";

/// A [`ListStore`] over a shared Redis connection.
pub struct RedisListStore {
    conn: ConnectionManager,
    cas_script: Script,
    timeout_ms: u64,
}

impl RedisListStore {
    /// Connect to a Redis server by URL (`redis://host:port/db`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(map_redis_error)?;
        debug!(url, "connected to redis backend");
        Ok(Self::with_connection(conn))
    }

    /// Wrap an existing connection manager.
    pub fn with_connection(conn: ConnectionManager) -> Self {
        Self {
            conn,
            cas_script: Script::new(CAS_SCRIPT),
            timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }

    /// Override the per-command response timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Run one command with the response timeout applied.
    async fn run<T: FromRedisValue>(&self, cmd: redis::Cmd) -> Result<T, StoreError> {
        let mut conn = self.conn.clone();
        match tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            cmd.query_async::<T>(&mut conn),
        )
        .await
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_redis_error(e)),
            Err(_) => Err(StoreError::Timeout {
                duration_ms: self.timeout_ms,
            }),
        }
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.run(redis::cmd("GET").arg(key).to_owned()).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.run::<()>(redis::cmd("SET").arg(key).arg(value).to_owned())
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let deleted: i64 = self.run(redis::cmd("DEL").arg(key).to_owned()).await?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let found: i64 = self.run(redis::cmd("EXISTS").arg(key).to_owned()).await?;
        Ok(found > 0)
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        if keys.is_empty() {
            return Ok(vec![]);
        }
        self.run(redis::cmd("MGET").arg(keys).to_owned()).await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new_value: &str,
    ) -> Result<(), StoreError> {
        match expected {
            // Create-if-absent is native: SET NX replies nil when the key
            // already exists.
            None => {
                let created: Option<String> = self
                    .run(redis::cmd("SET").arg(key).arg(new_value).arg("NX").to_owned())
                    .await?;
                if created.is_some() {
                    return Ok(());
                }
            }
            Some(expected) => {
                let mut conn = self.conn.clone();
                let mut invocation = self.cas_script.key(key);
                invocation.arg(expected).arg(new_value);
                let swapped: i64 = match tokio::time::timeout(
                    Duration::from_millis(self.timeout_ms),
                    invocation.invoke_async(&mut conn),
                )
                .await
                {
                    Ok(Ok(value)) => value,
                    Ok(Err(e)) => return Err(map_redis_error(e)),
                    Err(_) => {
                        return Err(StoreError::Timeout {
                            duration_ms: self.timeout_ms,
                        });
                    }
                };
                if swapped == 1 {
                    return Ok(());
                }
            }
        }

        // Guard failed; fetch the current value for the conflict report.
        let actual = self.get(key).await.unwrap_or(None);
        Err(StoreError::CompareAndSwapFailed {
            key: key.to_string(),
            expected: expected.map(str::to_string),
            actual,
        })
    }

    async fn list_append(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let length: i64 = self
            .run(redis::cmd("RPUSH").arg(key).arg(value).to_owned())
            .await?;
        Ok(length as u64)
    }

    async fn list_pop_front(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.run(redis::cmd("LPOP").arg(key).to_owned()).await
    }

    async fn list_push_front(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let length: i64 = self
            .run(redis::cmd("LPUSH").arg(key).arg(value).to_owned())
            .await?;
        Ok(length as u64)
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        self.run(redis::cmd("LRANGE").arg(key).arg(start).arg(stop).to_owned())
            .await
    }

    async fn list_set_at(&self, key: &str, index: u64, value: &str) -> Result<(), StoreError> {
        self.run::<()>(redis::cmd("LSET").arg(key).arg(index).arg(value).to_owned())
            .await
            .map_err(|e| classify_lset_error(key, index, e))
    }

    async fn list_remove_matching(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        // Count 0 removes every occurrence.
        let removed: i64 = self
            .run(redis::cmd("LREM").arg(key).arg(0).arg(value).to_owned())
            .await?;
        Ok(removed as u64)
    }
}

fn map_redis_error(e: redis::RedisError) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout {
            duration_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    } else {
        StoreError::Failed {
            reason: e.to_string(),
        }
    }
}

/// `LSET` reports bounds and missing-key conditions only through its error
/// text; translate them into the contract's explicit variants.
fn classify_lset_error(key: &str, index: u64, e: StoreError) -> StoreError {
    let StoreError::Failed { reason } = &e else {
        return e;
    };
    if reason.contains("index out of range") {
        StoreError::IndexOutOfRange {
            key: key.to_string(),
            index,
        }
    } else if reason.contains("no such key") {
        StoreError::NotFound {
            key: key.to_string(),
        }
    } else {
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cas_script_compares_before_setting() {
        assert!(CAS_SCRIPT.contains("GET"));
        assert!(CAS_SCRIPT.contains("SET"));
        // Guard and write touch the same single key.
        assert_eq!(CAS_SCRIPT.matches("KEYS[1]").count(), 2);
    }

    #[test]
    fn lset_errors_map_to_contract_variants() {
        let out_of_range = classify_lset_error(
            "l",
            5,
            StoreError::Failed {
                reason: "ERR index out of range".to_string(),
            },
        );
        assert!(matches!(out_of_range, StoreError::IndexOutOfRange { index: 5, .. }));

        let missing = classify_lset_error(
            "l",
            0,
            StoreError::Failed {
                reason: "ERR no such key".to_string(),
            },
        );
        assert!(matches!(missing, StoreError::NotFound { .. }));

        let timeout = classify_lset_error("l", 0, StoreError::Timeout { duration_ms: 10 });
        assert!(matches!(timeout, StoreError::Timeout { .. }));
    }
}
