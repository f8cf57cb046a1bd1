//! Lua scripts backing the Redis counting store
//!
//! Each operation is a single script, so Redis runs it atomically: a count
//! never interleaves with an insert. Scripts are loaded once at startup and
//! invoked by SHA afterwards.

use redis::Script;
use tracing::debug;
use uniques_common::StorageError;

/// `SADD` the client into the day set, index the day, refresh the TTL
///
/// KEYS[1] day set, KEYS[2] days index, ARGV[1] client id, ARGV[2] TTL
/// seconds (0 keeps forever), ARGV[3] day ordinal, ARGV[4] `YYYYMMDD`.
pub const INSERT_SRC: &str = r#"
local added = redis.call('SADD', KEYS[1], ARGV[1])
redis.call('ZADD', KEYS[2], ARGV[3], ARGV[4])
local ttl = tonumber(ARGV[2])
if ttl and ttl > 0 then
    redis.call('EXPIRE', KEYS[1], ttl)
end
return added
"#;

/// Cardinality of one day set (0 for a missing key)
pub const COUNT_DAY_SRC: &str = r#"
return redis.call('SCARD', KEYS[1])
"#;

/// Cardinality of the union of the populated day sets in an ordinal range
///
/// KEYS[1] days index, ARGV[1] day key prefix, ARGV[2] first ordinal,
/// ARGV[3] last ordinal. Index entries whose day set has expired are
/// dropped on the way.
pub const COUNT_WINDOW_SRC: &str = r#"
local days = redis.call('ZRANGEBYSCORE', KEYS[1], ARGV[2], ARGV[3])
local seen = {}
local count = 0
for _, day in ipairs(days) do
    local key = ARGV[1] .. day
    if redis.call('EXISTS', key) == 0 then
        redis.call('ZREM', KEYS[1], day)
    else
        for _, member in ipairs(redis.call('SMEMBERS', key)) do
            if not seen[member] then
                seen[member] = true
                count = count + 1
            end
        end
    end
end
return count
"#;

/// The three prepared scripts
#[derive(Debug, Clone)]
pub struct PreparedScripts {
    pub insert: Script,
    pub count_day: Script,
    pub count_window: Script,
}

impl PreparedScripts {
    pub fn new() -> Self {
        Self {
            insert: Script::new(INSERT_SRC),
            count_day: Script::new(COUNT_DAY_SRC),
            count_window: Script::new(COUNT_WINDOW_SRC),
        }
    }

    /// `SCRIPT LOAD` every script on `conn`
    ///
    /// Fails if the server rejects a script or reports a different SHA than
    /// the one computed locally.
    pub async fn load<C>(&self, conn: &mut C) -> Result<(), StorageError>
    where
        C: redis::aio::ConnectionLike + Send,
    {
        for (name, src, script) in self.sources() {
            let sha: String = redis::cmd("SCRIPT")
                .arg("LOAD")
                .arg(src)
                .query_async(&mut *conn)
                .await
                .map_err(|e| StorageError::Script(format!("Failed to load {} script: {}", name, e)))?;

            if sha != script.get_hash() {
                return Err(StorageError::Script(format!(
                    "SHA mismatch for {} script: server {} local {}",
                    name,
                    sha,
                    script.get_hash()
                )));
            }
            debug!(script = name, %sha, "Loaded script");
        }
        Ok(())
    }

    fn sources(&self) -> [(&'static str, &'static str, &Script); 3] {
        [
            ("insert", INSERT_SRC, &self.insert),
            ("count_day", COUNT_DAY_SRC, &self.count_day),
            ("count_window", COUNT_WINDOW_SRC, &self.count_window),
        ]
    }
}

impl Default for PreparedScripts {
    fn default() -> Self {
        Self::new()
    }
}
