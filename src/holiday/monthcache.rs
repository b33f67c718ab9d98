use std::collections::HashSet;

use tokio::sync::{
    Mutex,
    MutexGuard
};

use crate::time::datekey::{
    DateKey,
    MonthKey
};

/// One month of confirmed holidays. Built wholesale from a finished fetch,
/// never filled incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCache {
    month_key: MonthKey,
    holiday_dates: HashSet<DateKey>
}

impl MonthCache {
    /// Dates outside `month_key` are discarded.
    pub fn new(month_key: MonthKey, holiday_dates: HashSet<DateKey>) -> MonthCache {
        let holiday_dates = holiday_dates
            .into_iter()
            .filter(|d| month_key.contains(d))
            .collect();
        MonthCache { month_key, holiday_dates }
    }

    pub fn empty(month_key: MonthKey) -> MonthCache {
        MonthCache { month_key, holiday_dates: HashSet::new() }
    }

    pub fn month_key(&self) -> &MonthKey {
        &self.month_key
    }

    pub fn holiday_dates(&self) -> &HashSet<DateKey> {
        &self.holiday_dates
    }

    pub fn covers(&self, month_key: &MonthKey) -> bool {
        &self.month_key == month_key
    }

    pub fn contains(&self, date_key: &DateKey) -> bool {
        self.holiday_dates.contains(date_key)
    }
}

// ── 單一快取槽 ───────────────────────────────────────────────────────────────
//
// # 為何 guard 要跨越 fetch 持有
//
// 查詢引擎在 cache miss 時會在持有 guard 的狀態下 await 遠端 fetch。
// 同一時間其他查詢只能等待，等到 fetch 完成、新月份寫入後才取得 guard，
// 此時它們看到的已經是新快取，直接 hit。
// 因此同一個 month key 最多只會有一個 fetch 在進行中。
//
// 代價：fetch 期間，查詢其他月份（或同月份的 hit）也必須等待。
// 在單一月份、低頻查詢的情境下可以接受。

/// The process-wide holiday cache: absent, or exactly one month.
#[derive(Default)]
pub struct MonthCacheSlot {
    slot: Mutex<Option<MonthCache>>
}

impl MonthCacheSlot {
    pub fn new() -> MonthCacheSlot {
        MonthCacheSlot { slot: Mutex::new(None) }
    }

    pub async fn lock(&self) -> MonthCacheGuard<'_> {
        MonthCacheGuard { guard: self.slot.lock().await }
    }
}

pub struct MonthCacheGuard<'a> {
    guard: MutexGuard<'a, Option<MonthCache>>
}

impl MonthCacheGuard<'_> {
    /// `Some(is_holiday)` when the slot holds the month of `date_key`.
    pub fn lookup(&self, date_key: &DateKey) -> Option<bool> {
        let month_key = date_key.month_key();
        self.guard
            .as_ref()
            .filter(|cache| cache.covers(&month_key))
            .map(|cache| cache.contains(date_key))
    }

    pub fn cached_month(&self) -> Option<&MonthKey> {
        self.guard.as_ref().map(MonthCache::month_key)
    }

    /// Replaces whatever the slot held.
    pub fn replace(&mut self, cache: MonthCache) {
        *self.guard = Some(cache);
    }
}
