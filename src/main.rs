use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;

use koreanholiday::adapter::conditioncard::{
    ConditionCardArgs,
    IsKoreanHolidayCard
};
use koreanholiday::config::configuration::Configuration;
use koreanholiday::holiday::holidayfetcher::HolidayFetcher;
use koreanholiday::holiday::holidayqueryengine::HolidayQueryEngine;
use koreanholiday::time::kstclock::SystemClock;

const DEFAULT_CONFIG_PATH: &str = "koreanholiday.json";

/// koreanholiday [CONFIG_PATH] [YYYY-MM-DD]
///
/// Without a date, evaluates the `is_korean_holiday` card for today (KST).
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let date = match args.next().map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d")).transpose() {
        Ok(date) => date,
        Err(error) => {
            eprintln!("invalid date: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let config = Configuration::load_or_default(&config_path).with_env_overrides();
    let fetcher = match HolidayFetcher::from_configuration(&config) {
        Ok(fetcher) => fetcher,
        Err(error) => {
            log::error!("{}", error);
            return ExitCode::FAILURE;
        }
    };
    let failure_policy = config.failure_policy();
    let engine = Arc::new(
        HolidayQueryEngine::new(fetcher, config, SystemClock).with_failure_policy(failure_policy)
    );

    let is_holiday = match date {
        Some(date) => engine.is_holiday(date).await,
        None => {
            let card = IsKoreanHolidayCard::new(Arc::clone(&engine));
            card.run(&ConditionCardArgs::new("true")).await
        }
    };

    println!("{}", if is_holiday { "holiday" } else { "not a holiday" });
    ExitCode::SUCCESS
}
