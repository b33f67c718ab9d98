pub mod adapter {
    pub mod conditioncard;
}

pub mod config {
    pub mod configerror;
    pub mod configuration;
    pub mod credential;
}

pub mod holiday {
    pub mod fetcherror;
    pub mod holidayrecord;
    pub mod holidayfetcher;
    pub mod monthcache;
    pub mod holidayqueryengine;
}

pub mod time {
    pub mod datekey;
    pub mod kstclock;
}
