pub mod cache;
pub mod redis;

pub use self::cache::{MemoryCache, MetadataCache};
pub use self::redis::{create_redis_client, CacheWriterHandle, RedisCache};
