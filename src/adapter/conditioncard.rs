use std::sync::Arc;

use serde::Deserialize;

use crate::config::credential::CredentialProvider;
use crate::holiday::holidayfetcher::HolidaySource;
use crate::holiday::holidayqueryengine::HolidayQueryEngine;
use crate::time::kstclock::Clock;

pub const CONDITION_CARD_ID: &str = "is_korean_holiday";

/// Arguments the host passes to the card: `{ "flag": "true" }` means
/// "holds when today is a holiday", anything else means "holds when it is not".
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionCardArgs {
    flag: String
}

impl ConditionCardArgs {
    pub fn new(flag: impl Into<String>) -> ConditionCardArgs {
        ConditionCardArgs { flag: flag.into() }
    }

    pub fn expects_holiday(&self) -> bool {
        self.flag == "true"
    }
}

/// Bridges the host's condition-card run listener to the query engine.
pub struct IsKoreanHolidayCard<S, K, C> {
    engine: Arc<HolidayQueryEngine<S, K, C>>
}

impl<S, K, C> IsKoreanHolidayCard<S, K, C> where
    S: HolidaySource,
    K: CredentialProvider,
    C: Clock {
    pub fn new(engine: Arc<HolidayQueryEngine<S, K, C>>) -> IsKoreanHolidayCard<S, K, C> {
        IsKoreanHolidayCard { engine }
    }

    pub fn id(&self) -> &'static str {
        CONDITION_CARD_ID
    }

    pub async fn run(&self, args: &ConditionCardArgs) -> bool {
        self.engine.is_holiday_today().await == args.expects_holiday()
    }

    /// Same as `run`, with the arguments still in the host's JSON form.
    /// Unreadable arguments fall back to `flag = "false"`.
    pub async fn run_json(&self, args: serde_json::Value) -> bool {
        let args = serde_json::from_value::<ConditionCardArgs>(args).unwrap_or_else(|error| {
            log::warn!("Bad arguments for {}: {}", CONDITION_CARD_ID, error);
            ConditionCardArgs::new("false")
        });
        self.run(&args).await
    }
}
