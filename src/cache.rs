//! 全相联块缓存，按逻辑时钟做 LRU 淘汰
//!
//! 容量很小（最多 4096 项），查找和淘汰都用线性扫描；
//! 淘汰时选 `last_access` 最小的项，相同时选下标最小的。

use log::{debug, trace};

use crate::{
    disk::{is_valid_block, Block, BLOCK_SIZE},
    error::{JbodError, Result},
};

pub const MIN_CACHE_ENTRIES: usize = 2;
pub const MAX_CACHE_ENTRIES: usize = 4096;

#[derive(Debug, Clone)]
struct CacheEntry {
    disk: u32,
    block: u32,
    content: Block,
    valid: bool,
    last_access: u64,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            disk: 0,
            block: 0,
            content: [0; BLOCK_SIZE],
            valid: false,
            last_access: 0,
        }
    }

    fn matches(&self, disk: u32, block: u32) -> bool {
        self.valid && self.disk == disk && self.block == block
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub capacity: usize,
    pub valid: usize,
    pub queries: u64,
    pub hits: u64,
}

/// 缓存上下文：`entries` 为 `None` 表示尚未创建
#[derive(Debug, Default)]
pub struct Cache {
    entries: Option<Vec<CacheEntry>>,
    clock: u64,
    queries: u64,
    hits: u64,
    populated: bool,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, capacity: usize) -> Result<()> {
        if !(MIN_CACHE_ENTRIES..=MAX_CACHE_ENTRIES).contains(&capacity) {
            return Err(JbodError::InvalidCapacity(capacity));
        }
        if self.entries.is_some() {
            return Err(JbodError::CacheExists);
        }

        self.entries = Some(vec![CacheEntry::empty(); capacity]);
        debug!("cache created with {} entries", capacity);
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<()> {
        if self.entries.take().is_none() {
            return Err(JbodError::CacheMissing);
        }

        self.clock = 0;
        self.queries = 0;
        self.hits = 0;
        self.populated = false;
        debug!("cache destroyed");
        Ok(())
    }

    pub fn enabled(&self) -> bool {
        self.entries.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// 只判断是否存在，不计入查询次数也不刷新访问时间
    pub fn contains(&self, disk: u32, block: u32) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|entries| entries.iter().any(|e| e.matches(disk, block)))
    }

    pub fn lookup(&mut self, disk: u32, block: u32) -> Option<Block> {
        if !self.populated {
            return None;
        }
        let entries = self.entries.as_mut()?;

        self.queries += 1;
        let entry = entries.iter_mut().find(|e| e.matches(disk, block))?;

        self.hits += 1;
        self.clock += 1;
        entry.last_access = self.clock;
        trace!("cache hit: disk {} block {}", disk, block);
        Some(entry.content)
    }

    pub fn insert(&mut self, disk: u32, block: u32, content: &Block) -> Result<()> {
        let entries = self.entries.as_mut().ok_or(JbodError::CacheMissing)?;
        if !is_valid_block(disk, block) {
            return Err(JbodError::InvalidLocation { disk, block });
        }
        if entries.iter().any(|e| e.matches(disk, block)) {
            return Err(JbodError::DuplicateEntry { disk, block });
        }

        let slot = match entries.iter().position(|e| !e.valid) {
            Some(free) => free,
            None => {
                // min_by_key 在相等时返回第一个，正好满足“下标最小”
                let victim = entries
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, e)| e.last_access)
                    .map(|(i, _)| i)
                    .ok_or(JbodError::CacheMissing)?;
                trace!(
                    "evicting disk {} block {} from slot {}",
                    entries[victim].disk,
                    entries[victim].block,
                    victim
                );
                victim
            }
        };

        self.clock += 1;
        entries[slot] = CacheEntry {
            disk,
            block,
            content: *content,
            valid: true,
            last_access: self.clock,
        };
        self.populated = true;
        Ok(())
    }

    /// 写穿更新：命中则覆盖内容，未命中什么也不做
    pub fn update(&mut self, disk: u32, block: u32, content: &Block) {
        let Some(entries) = self.entries.as_mut() else {
            return;
        };
        if let Some(entry) = entries.iter_mut().find(|e| e.matches(disk, block)) {
            self.clock += 1;
            entry.content = *content;
            entry.last_access = self.clock;
        }
    }

    /// 命中率；还没有查询时返回 `None`
    pub fn hit_rate(&self) -> Option<f64> {
        if self.queries == 0 {
            None
        } else {
            Some(self.hits as f64 / self.queries as f64)
        }
    }

    pub fn stats(&self) -> CacheStats {
        let (capacity, valid) = match &self.entries {
            Some(entries) => (entries.len(), entries.iter().filter(|e| e.valid).count()),
            None => (0, 0),
        };
        CacheStats {
            capacity,
            valid,
            queries: self.queries,
            hits: self.hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_of(byte: u8) -> Block {
        [byte; BLOCK_SIZE]
    }

    fn cache_with(capacity: usize) -> Cache {
        let mut cache = Cache::new();
        cache.create(capacity).unwrap();
        cache
    }

    #[test]
    fn capacity_bounds() {
        let mut cache = Cache::new();
        for bad in [0, 1, 4097, usize::MAX] {
            assert!(matches!(
                cache.create(bad),
                Err(JbodError::InvalidCapacity(_))
            ));
        }
        assert!(!cache.enabled());

        for good in [2, 3, 4096] {
            cache.create(good).unwrap();
            assert!(matches!(cache.create(good), Err(JbodError::CacheExists)));
            assert!(cache.enabled());
            cache.destroy().unwrap();
            assert!(matches!(cache.destroy(), Err(JbodError::CacheMissing)));
        }
    }

    #[test]
    fn insert_requires_a_cache() {
        let mut cache = Cache::new();
        assert!(matches!(
            cache.insert(0, 0, &block_of(1)),
            Err(JbodError::CacheMissing)
        ));
        assert_eq!(cache.lookup(0, 0), None);
    }

    #[test]
    fn insert_rejects_bad_geometry() {
        let mut cache = cache_with(4);
        assert!(cache.insert(16, 0, &block_of(1)).is_err());
        assert!(cache.insert(0, 256, &block_of(1)).is_err());
        assert!(cache.insert(15, 255, &block_of(1)).is_ok());
    }

    #[test]
    fn lookup_round_trip() {
        let mut cache = cache_with(4);
        let mut content = [0u8; BLOCK_SIZE];
        for (i, b) in content.iter_mut().enumerate() {
            *b = i as u8;
        }
        cache.insert(3, 7, &content).unwrap();
        assert_eq!(cache.lookup(3, 7), Some(content));
        assert_eq!(cache.lookup(7, 3), None);
    }

    #[test]
    fn empty_slots_never_match() {
        // 未使用的槽位初值是 (0, 0)，不能被当成命中
        let mut cache = cache_with(4);
        cache.insert(1, 1, &block_of(1)).unwrap();
        assert_eq!(cache.lookup(0, 0), None);
    }

    #[test]
    fn duplicate_insert_is_rejected_without_mutation() {
        let mut cache = cache_with(4);
        cache.insert(0, 0, &block_of(1)).unwrap();
        assert!(matches!(
            cache.insert(0, 0, &block_of(2)),
            Err(JbodError::DuplicateEntry { disk: 0, block: 0 })
        ));
        assert_eq!(cache.lookup(0, 0), Some(block_of(1)));
    }

    #[test]
    fn update_missing_key_is_a_noop() {
        let mut cache = cache_with(2);
        cache.insert(0, 1, &block_of(1)).unwrap();
        cache.update(0, 2, &block_of(9));
        assert_eq!(cache.lookup(0, 2), None);
        assert_eq!(cache.stats().valid, 1);

        cache.update(0, 1, &block_of(5));
        assert_eq!(cache.lookup(0, 1), Some(block_of(5)));
    }

    #[test]
    fn no_eviction_until_full_then_lru() {
        let mut cache = cache_with(3);
        cache.insert(0, 0, &block_of(0)).unwrap();
        cache.insert(0, 1, &block_of(1)).unwrap();
        cache.insert(0, 2, &block_of(2)).unwrap();
        assert_eq!(cache.stats().valid, 3);

        // 访问 (0,0)，此时最久未用的是 (0,1)
        assert!(cache.lookup(0, 0).is_some());
        cache.insert(0, 3, &block_of(3)).unwrap();

        assert_eq!(cache.lookup(0, 1), None);
        assert!(cache.lookup(0, 0).is_some());
        assert!(cache.lookup(0, 2).is_some());
        assert_eq!(cache.lookup(0, 3), Some(block_of(3)));
    }

    #[test]
    fn update_refreshes_recency() {
        let mut cache = cache_with(2);
        cache.insert(1, 0, &block_of(0)).unwrap();
        cache.insert(1, 1, &block_of(1)).unwrap();
        cache.update(1, 0, &block_of(7));
        cache.insert(1, 2, &block_of(2)).unwrap();

        assert_eq!(cache.lookup(1, 1), None);
        assert_eq!(cache.lookup(1, 0), Some(block_of(7)));
    }

    #[test]
    fn hit_rate_is_guarded() {
        let mut cache = cache_with(2);
        assert_eq!(cache.hit_rate(), None);

        cache.insert(0, 0, &block_of(0)).unwrap();
        cache.lookup(0, 0);
        cache.lookup(0, 1);
        assert_eq!(cache.hit_rate(), Some(0.5));
        assert_eq!(
            cache.stats(),
            CacheStats {
                capacity: 2,
                valid: 1,
                queries: 2,
                hits: 1
            }
        );
    }

    #[test]
    fn destroy_resets_counters() {
        let mut cache = cache_with(2);
        cache.insert(0, 0, &block_of(0)).unwrap();
        cache.lookup(0, 0);
        cache.destroy().unwrap();

        cache.create(2).unwrap();
        assert_eq!(cache.stats(), CacheStats { capacity: 2, ..Default::default() });
        assert_eq!(cache.lookup(0, 0), None);
    }
}
