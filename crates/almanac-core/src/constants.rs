/// Methods advertised in the `Allow` header, alphabetically.
pub const ALLOWED_METHODS: &str = "DELETE, GET, OPTIONS, PROPFIND, PUT, REPORT";

/// DAV compliance classes advertised in the `DAV` header.
pub const DAV_COMPLIANCE: &str = "1, calendar-access";

/// Scheme token expected at the start of an `Authorization` header.
pub const BASIC_SCHEME: &str = "Basic";

const UTF8_PARAM: &str = "; charset=utf-8";

pub const CALENDAR_CONTENT_TYPE: &str = const_str::concat!("text/calendar", UTF8_PARAM);
pub const XML_CONTENT_TYPE: &str = const_str::concat!("application/xml", UTF8_PARAM);
pub const TEXT_CONTENT_TYPE: &str = const_str::concat!("text/plain", UTF8_PARAM);

/// Charsets tried after the request-declared and configured ones.
pub const FALLBACK_CHARSETS: [&str; 2] = ["utf-8", "iso-8859-1"];

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "ALMANAC_CONFIG";
pub const CONFIG_ENV_PREFIX: &str = "ALMANAC";
pub const DEFAULT_CONFIG_FILE: &str = "almanac.toml";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5232;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_REQUEST_CHARSET: &str = "utf-8";
pub const DEFAULT_REALM: &str = "Almanac - Password Required";
pub const DEFAULT_STORAGE_FOLDER: &str = "./calendars";
pub const DEFAULT_LOG_LEVEL: &str = "info";
