/// Longest stay a single reservation may cover.
pub const MAX_NIGHTS: u32 = 365;

/// Most guests (primary customer included) on one reservation.
pub const MAX_GUESTS: u32 = 50;

/// Extra-service line items allowed on one quote.
pub const MAX_LINE_ITEMS: usize = 64;

/// Max byte length of a line-item label.
pub const MAX_LABEL_LEN: usize = 128;

/// Max reservations accepted in one snapshot from the API.
pub const MAX_SNAPSHOT_RESERVATIONS: usize = 100_000;

/// Max days a `free_ranges` window may span.
pub const MAX_QUERY_WINDOW_DAYS: i64 = 3 * 366;

/// Six rows of seven days.
pub const CALENDAR_GRID_DAYS: usize = 42;

/// Calendar months are limited to four-digit years.
pub const MIN_CALENDAR_YEAR: i32 = 1;
pub const MAX_CALENDAR_YEAR: i32 = 9999;
