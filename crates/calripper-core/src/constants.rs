/// Product identifier written to every generated calendar.
pub const PRODUCT_NAME: &str = "calripper";
pub const PRODID: &str = const_str::concat!("-//", PRODUCT_NAME, "//Calendar Feeds//EN");

/// Prefix for synthesized per-tag calendar names.
pub const TAG_CALENDAR_PREFIX: &str = "tag-";

/// Name of the source that carries recurring-definition events.
pub const RECURRING_SOURCE_NAME: &str = "recurring";

/// File extension for rendered calendar feeds.
pub const FEED_EXTENSION: &str = "ics";
