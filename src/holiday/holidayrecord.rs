use std::collections::HashSet;

use serde::{
    Deserialize,
    Deserializer
};

use crate::holiday::fetcherror::FetchError;
use crate::time::datekey::{
    DateKey,
    MonthKey
};

// ── 上游回應外殼 ──────────────────────────────────────────────────────────────
//
// { "response": { "header": {...}, "body": { "items": { "item": <obj | [obj]> }, ... } } }
//
// 只有 `items.item` 與每筆的 `locdate` / `isHoliday` 影響結果；
// `header` 用於判斷上游錯誤，`totalCount` 用於偵測分頁截斷。

#[derive(Deserialize)]
pub struct HolidayApiResponse {
    response: ResponseEnvelope
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    header: Option<ResponseHeader>,
    #[serde(default)]
    body: Option<ResponseBody>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseHeader {
    #[serde(default)]
    result_code: String,
    #[serde(default)]
    result_msg: String
}

impl ResponseHeader {
    /// The portal reports "00"; some of its services pad to "0000".
    fn is_success(&self) -> bool {
        !self.result_code.is_empty() && self.result_code.bytes().all(|b| b == b'0')
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody {
    #[serde(default)]
    items: Option<ItemsContainer>,
    #[serde(default)]
    total_count: Option<u32>
}

/// A month without any entry comes back as `"items": ""`, `{}` or `null`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsContainer {
    Items {
        #[serde(default)]
        item: Option<ItemList>
    },
    Blank(String)
}

/// `items.item` collapses to a bare object when the period holds exactly one
/// entry. Both shapes are accepted and flattened by `into_records`.
///
/// Entries stay raw JSON until then, so one odd entry cannot reject its siblings.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ItemList {
    Many(Vec<serde_json::Value>),
    One(serde_json::Value)
}

impl ItemList {
    /// Decodes each entry on its own; entries that are not records are skipped.
    pub fn into_records(self) -> Vec<HolidayRecord> {
        let values = match self {
            ItemList::Many(values) => values,
            ItemList::One(value) => vec![value]
        };
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<HolidayRecord>(value) {
                Ok(record) => Some(record),
                Err(error) => {
                    log::warn!("Skipping unreadable holiday entry: {}", error);
                    None
                }
            })
            .collect()
    }
}

// ── 單筆紀錄 ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String)
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s
        }
    }
}

fn optional_number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where D: Deserializer<'de> {
    Option::<NumberOrString>::deserialize(deserializer).map(|v| v.map(NumberOrString::into_string))
}

/// Every field is optional: an entry without `isHoliday` or `locdate` simply
/// never counts as a holiday.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRecord {
    #[serde(default, deserialize_with = "optional_number_or_string")]
    locdate: Option<String>,
    #[serde(default)]
    is_holiday: Option<String>,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    seq: Option<String>,
    #[serde(default)]
    date_name: Option<String>,
    #[serde(default)]
    date_kind: Option<String>
}

impl HolidayRecord {
    pub fn locdate(&self) -> Option<&str> {
        self.locdate.as_deref()
    }

    /// Only the literal "Y" marks a public holiday; anniversaries and other
    /// observances share the feed with "N".
    pub fn is_confirmed_holiday(&self) -> bool {
        self.is_holiday.as_deref() == Some("Y")
    }

    pub fn seq(&self) -> Option<&str> {
        self.seq.as_deref()
    }

    pub fn date_name(&self) -> Option<&str> {
        self.date_name.as_deref()
    }

    pub fn date_kind(&self) -> Option<&str> {
        self.date_kind.as_deref()
    }
}

// ── 正規化 ───────────────────────────────────────────────────────────────────

impl HolidayApiResponse {
    /// Flattens the envelope into a plain record list.
    ///
    /// - header with a non-success code → `FetchError::Upstream`
    /// - no `body` → `FetchError::MissingBody`
    /// - blank or null `items`, or `items` without `item` → empty list (a month with no entries)
    pub fn into_records(self) -> Result<Vec<HolidayRecord>, FetchError> {
        if let Some(header) = self.response.header {
            if !header.is_success() {
                return Err(FetchError::Upstream {
                    code: header.result_code,
                    message: header.result_msg
                });
            }
            log::debug!("Upstream result {}: {}", header.result_code, header.result_msg);
        }

        let body = self.response.body.ok_or(FetchError::MissingBody)?;
        let records = match body.items {
            Some(ItemsContainer::Items { item: Some(list) }) => list.into_records(),
            Some(ItemsContainer::Items { item: None }) | Some(ItemsContainer::Blank(_)) | None => Vec::new()
        };

        if let Some(total_count) = body.total_count {
            if total_count as usize > records.len() {
                log::warn!(
                    "Upstream reports {} entries but only {} were read; numOfRows may be too small",
                    total_count,
                    records.len()
                );
            }
        }
        Ok(records)
    }
}

/// Keeps the confirmed holidays of `month`, keyed by date.
///
/// Entries with an unparseable `locdate` or one outside `month` are dropped,
/// so every key in the result lies inside the queried month.
pub fn holiday_dates_in_month(records: Vec<HolidayRecord>, month: &MonthKey) -> HashSet<DateKey> {
    let mut holidays = HashSet::new();
    for record in records.into_iter().filter(HolidayRecord::is_confirmed_holiday) {
        let Some(locdate) = record.locdate() else {
            log::warn!("Dropping holiday without locdate");
            continue;
        };
        match DateKey::parse(locdate) {
            Ok(date_key) if month.contains(&date_key) => {
                holidays.insert(date_key);
            },
            Ok(date_key) => {
                log::warn!("Dropping holiday {} outside requested month {}", date_key, month);
            },
            Err(error) => {
                log::warn!("Dropping holiday with bad locdate '{}': {}", locdate, error);
            }
        }
    }
    holidays
}

/// Decodes a raw payload straight into the month's holiday set.
pub fn parse_month_holidays(payload: &[u8], month: &MonthKey) -> Result<HashSet<DateKey>, FetchError> {
    let response: HolidayApiResponse = serde_json::from_slice(payload)?;
    let records = response.into_records()?;
    Ok(holiday_dates_in_month(records, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn january() -> MonthKey {
        MonthKey::parse("202401").unwrap()
    }

    fn keys(keys: &[&str]) -> HashSet<DateKey> {
        keys.iter().map(|k| DateKey::parse(k).unwrap()).collect()
    }

    #[test]
    fn test_single_object_item() {
        let json = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL SERVICE."},
            "body":{"items":{"item":{"dateKind":"01","dateName":"1월1일","isHoliday":"Y","locdate":20240101,"seq":1}},
            "numOfRows":100,"pageNo":1,"totalCount":1}}}"#;
        let holidays = parse_month_holidays(json.as_bytes(), &january()).unwrap();
        assert_eq!(holidays, keys(&["20240101"]));
    }

    #[test]
    fn test_array_keeps_only_confirmed() {
        let json = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL SERVICE."},
            "body":{"items":{"item":[
                {"dateKind":"01","dateName":"설날","isHoliday":"Y","locdate":20240209,"seq":1},
                {"dateKind":"01","dateName":"설날","isHoliday":"Y","locdate":20240210,"seq":1},
                {"dateKind":"02","dateName":"기념일","isHoliday":"N","locdate":20240214,"seq":1},
                {"dateKind":"01","dateName":"대체공휴일","isHoliday":"Y","locdate":20240212,"seq":1}
            ]},"numOfRows":100,"pageNo":1,"totalCount":4}}}"#;
        let february = MonthKey::parse("202402").unwrap();
        let holidays = parse_month_holidays(json.as_bytes(), &february).unwrap();
        assert_eq!(holidays, keys(&["20240209", "20240210", "20240212"]));
    }

    #[test]
    fn test_flag_must_be_literal_y() {
        let json = r#"{"response":{"body":{"items":{"item":[
                {"isHoliday":"y","locdate":20240101},
                {"isHoliday":"YES","locdate":20240102},
                {"isHoliday":"","locdate":20240103}
            ]}}}}"#;
        let holidays = parse_month_holidays(json.as_bytes(), &january()).unwrap();
        assert!(holidays.is_empty());
    }

    #[test]
    fn test_blank_items_is_an_empty_month() {
        let json = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL SERVICE."},
            "body":{"items":"","numOfRows":100,"pageNo":1,"totalCount":0}}}"#;
        assert!(parse_month_holidays(json.as_bytes(), &january()).unwrap().is_empty());

        let json = r#"{"response":{"body":{"items":{},"totalCount":0}}}"#;
        assert!(parse_month_holidays(json.as_bytes(), &january()).unwrap().is_empty());
    }

    #[test]
    fn test_incomplete_entry_does_not_reject_siblings() {
        let json = r#"{"response":{"body":{"items":{"item":[
                {"isHoliday":"Y","locdate":20240101},
                {"dateName":"observance","locdate":20240102},
                {"isHoliday":"Y"},
                {"isHoliday":"Y","locdate":true},
                "unexpected"
            ]}}}}"#;
        let holidays = parse_month_holidays(json.as_bytes(), &january()).unwrap();
        assert_eq!(holidays, keys(&["20240101"]));
    }

    #[test]
    fn test_null_items_is_an_empty_month() {
        let json = r#"{"response":{"body":{"items":null,"totalCount":0}}}"#;
        assert!(parse_month_holidays(json.as_bytes(), &january()).unwrap().is_empty());

        let json = r#"{"response":{"body":{"items":{"item":null}}}}"#;
        assert!(parse_month_holidays(json.as_bytes(), &january()).unwrap().is_empty());
    }

    #[test]
    fn test_short_page_keeps_what_was_read() {
        let json = r#"{"response":{"body":{"items":{"item":{"isHoliday":"Y","locdate":20240101}},
            "numOfRows":1,"pageNo":1,"totalCount":3}}}"#;
        let response: HolidayApiResponse = serde_json::from_str(json).unwrap();
        let records = response.into_records().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_confirmed_holiday());
    }

    #[test]
    fn test_string_locdate_is_accepted() {
        let json = r#"{"response":{"body":{"items":{"item":{"isHoliday":"Y","locdate":"20240101","seq":"1"}}}}}"#;
        let response: HolidayApiResponse = serde_json::from_str(json).unwrap();
        let records = response.into_records().unwrap();
        assert_eq!(records[0].locdate(), Some("20240101"));
        assert_eq!(records[0].seq(), Some("1"));
        assert_eq!(records[0].date_name(), None);
    }

    #[test]
    fn test_out_of_month_entries_are_dropped() {
        let json = r#"{"response":{"body":{"items":{"item":[
                {"isHoliday":"Y","locdate":20240101},
                {"isHoliday":"Y","locdate":20231225},
                {"isHoliday":"Y","locdate":2024011}
            ]}}}}"#;
        let holidays = parse_month_holidays(json.as_bytes(), &january()).unwrap();
        assert_eq!(holidays, keys(&["20240101"]));
    }

    #[test]
    fn test_upstream_error_code() {
        let json = r#"{"response":{"header":{"resultCode":"30","resultMsg":"SERVICE_KEY_IS_NOT_REGISTERED_ERROR"}}}"#;
        let error = parse_month_holidays(json.as_bytes(), &january()).unwrap_err();
        assert!(matches!(error, FetchError::Upstream { ref code, .. } if code == "30"));
    }

    #[test]
    fn test_missing_body_and_garbage() {
        let json = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL SERVICE."}}}"#;
        assert!(matches!(parse_month_holidays(json.as_bytes(), &january()), Err(FetchError::MissingBody)));

        let xml = b"<OpenAPI_ServiceResponse><cmmMsgHeader/></OpenAPI_ServiceResponse>";
        assert!(matches!(parse_month_holidays(xml, &january()), Err(FetchError::Decode(_))));
    }
}
