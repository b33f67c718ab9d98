use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use reqwest::{
    Client,
    Url
};

use crate::config::configuration::{
    Configuration,
    ServiceKeyEncoding
};
use crate::holiday::fetcherror::FetchError;
use crate::holiday::holidayrecord::parse_month_holidays;
use crate::time::datekey::{
    DateKey,
    MonthKey
};

pub const DEFAULT_ENDPOINT: &str =
    "https://apis.data.go.kr/B090041/openapi/service/SpcdeInfoService/getRestDeInfo";

/// A month never holds more than a handful of entries, so one page of this
/// size always covers it and no pagination is needed.
pub const DEFAULT_NUM_OF_ROWS: u32 = 100;

/// Source of one month's confirmed holidays.
///
/// `Ok` with an empty set means the month really has none; `Err` means the
/// month could not be determined. The query engine decides what to do with
/// the difference.
pub trait HolidaySource: Send + Sync {
    fn fetch_month(
        &self,
        month: &MonthKey,
        credential: &str,
    ) -> impl Future<Output = Result<HashSet<DateKey>, FetchError>> + Send;
}

/// Client for the public-data portal's special-day service (`getRestDeInfo`).
///
/// Holds nothing between calls except the pooled HTTP client.
#[derive(Clone)]
pub struct HolidayFetcher {
    client: Client,
    endpoint: Url,
    num_of_rows: u32,
    key_encoding: ServiceKeyEncoding
}

impl HolidayFetcher {
    pub fn new(
        endpoint: String,
        num_of_rows: u32,
        timeout: Duration,
        key_encoding: ServiceKeyEncoding
    ) -> Result<HolidayFetcher, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        HolidayFetcher::with_client(client, endpoint, num_of_rows, key_encoding)
    }

    /// Uses a caller-built client as is (proxy, TLS and timeout settings included).
    pub fn with_client(
        client: Client,
        endpoint: String,
        num_of_rows: u32,
        key_encoding: ServiceKeyEncoding
    ) -> Result<HolidayFetcher, FetchError> {
        let endpoint = Url::parse(&endpoint)
            .map_err(|error| FetchError::InvalidEndpoint(format!("{}: {}", endpoint, error)))?;
        Ok(HolidayFetcher { client, endpoint, num_of_rows, key_encoding })
    }

    pub fn from_configuration(config: &Configuration) -> Result<HolidayFetcher, FetchError> {
        HolidayFetcher::new(
            config.endpoint().to_owned(),
            config.num_of_rows(),
            config.timeout(),
            config.service_key_encoding()
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `solYear`, `solMonth`, `ServiceKey`, `_type=json`, `numOfRows`, in that order.
    ///
    /// An `Encoded` key was issued already percent-encoded by the portal and
    /// is written into the query verbatim; encoding it again breaks it.
    pub fn request_url(&self, year: i32, month: &str, credential: &str) -> Url {
        let mut url = self.endpoint.clone();

        url.query_pairs_mut()
            .append_pair("solYear", &year.to_string())
            .append_pair("solMonth", month);

        match self.key_encoding {
            ServiceKeyEncoding::Decoded => {
                url.query_pairs_mut().append_pair("ServiceKey", credential);
            },
            ServiceKeyEncoding::Encoded => {
                let query = format!("{}&ServiceKey={}", url.query().unwrap_or_default(), credential);
                url.set_query(Some(&query));
            }
        }

        url.query_pairs_mut()
            .append_pair("_type", "json")
            .append_pair("numOfRows", &self.num_of_rows.to_string());
        url
    }

    /// Confirmed holidays of `year`/`month` ("01".."12").
    ///
    /// Never fails: any transport, status or payload problem is logged and
    /// reported as an empty set.
    pub async fn fetch_month_holidays(&self, year: i32, month: &str, credential: &str) -> HashSet<DateKey> {
        let month_key = match MonthKey::parse(&format!("{:04}{}", year, month)) {
            Ok(key) => key,
            Err(error) => {
                log::error!("Invalid month {}-{}: {}", year, month, error);
                return HashSet::new();
            }
        };

        self.fetch_month(&month_key, credential).await.unwrap_or_else(|error| {
            log::error!("Failed to fetch holidays: {}", error);
            HashSet::new()
        })
    }
}

impl HolidaySource for HolidayFetcher {
    async fn fetch_month(&self, month: &MonthKey, credential: &str) -> Result<HashSet<DateKey>, FetchError> {
        let url = self.request_url(month.year(), month.month_str(), credential);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let payload = response.bytes().await?;
        parse_month_holidays(&payload, month)
    }
}
