use chrono::{
    DateTime,
    NaiveDate,
    Utc
};
use serde::Deserialize;

use crate::config::credential::CredentialProvider;
use crate::holiday::holidayfetcher::HolidaySource;
use crate::holiday::monthcache::{
    MonthCache,
    MonthCacheSlot
};
use crate::time::datekey::{
    DateKey,
    MonthKey
};
use crate::time::kstclock::{
    Clock,
    to_kst_date
};

/// What a failed fetch leaves in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum FailurePolicy {
    /// Install an empty month: no further fetch until another month is queried.
    #[default]
    CacheEmpty,
    /// Leave the slot untouched: the next query for the month fetches again.
    RetryNextQuery
}

/// Answers "is this date a Korean public holiday", one cached month at a time.
///
/// Every failure degrades to `false`; nothing is returned as an error.
pub struct HolidayQueryEngine<S, K, C> {
    source: S,
    credentials: K,
    clock: C,
    failure_policy: FailurePolicy,
    cache: MonthCacheSlot
}

impl<S, K, C> HolidayQueryEngine<S, K, C> where
    S: HolidaySource,
    K: CredentialProvider,
    C: Clock {
    pub fn new(source: S, credentials: K, clock: C) -> HolidayQueryEngine<S, K, C> {
        HolidayQueryEngine {
            source,
            credentials,
            clock,
            failure_policy: FailurePolicy::default(),
            cache: MonthCacheSlot::new()
        }
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> HolidayQueryEngine<S, K, C> {
        self.failure_policy = failure_policy;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Today in Korea, whatever the host timezone is.
    pub async fn is_holiday_today(&self) -> bool {
        self.is_holiday_at(self.clock.now_utc()).await
    }

    pub async fn is_holiday_at(&self, instant: DateTime<Utc>) -> bool {
        self.is_holiday(to_kst_date(instant)).await
    }

    /// `date` is a civil date in KST.
    pub async fn is_holiday(&self, date: NaiveDate) -> bool {
        let Some(credential) = self.credentials.service_key() else {
            log::error!("Service key is missing in settings.");
            return false;
        };

        let date_key = DateKey::from_date(date);
        let month_key = MonthKey::from_date(date);

        let mut cache = self.cache.lock().await;
        if let Some(is_holiday) = cache.lookup(&date_key) {
            log::info!("Cache hit for {}", month_key);
            return is_holiday;
        }

        log::info!("Fetching holidays for {} from API...", month_key);
        match self.source.fetch_month(&month_key, &credential).await {
            Ok(holiday_dates) => {
                log::debug!("{} holidays in {}", holiday_dates.len(), month_key);
                let month_cache = MonthCache::new(month_key, holiday_dates);
                let is_holiday = month_cache.contains(&date_key);
                cache.replace(month_cache);
                is_holiday
            },
            Err(error) => {
                log::error!("Failed to fetch holidays for {}: {}", month_key, error);
                match self.failure_policy {
                    FailurePolicy::CacheEmpty => {
                        log::warn!("Treating {} as a month without holidays", month_key);
                        cache.replace(MonthCache::empty(month_key));
                    },
                    FailurePolicy::RetryNextQuery => {
                        log::debug!("Leaving cache untouched, {} will be fetched again", month_key);
                    }
                }
                false
            }
        }
    }

    /// The month currently held in the cache, if any.
    pub async fn cached_month(&self) -> Option<MonthKey> {
        self.cache.lock().await.cached_month().cloned()
    }
}
