pub mod limits {

    pub const MAX_LIST_RESULTS: usize = 12;

    pub const MAX_CAST_MEMBERS: usize = 10;

    pub const FAVORITE_SLOTS: i32 = 4;
}

pub mod catalog {

    /// Region whose popular-movies feed is served from the curated discover
    /// listing instead of the global popularity chart.
    pub const CURATED_REGION: &str = "TR";
}

pub mod backfill {
    use std::time::Duration;

    /// Pause between consecutive upstream lookups while backfilling.
    pub const THROTTLE: Duration = Duration::from_millis(250);
}
