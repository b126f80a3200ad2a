/// Default number of items per page for paginated list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Hard ceiling for page size regardless of what the client asks for.
pub const MAX_PAGE_SIZE: i64 = 100;
