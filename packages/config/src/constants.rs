// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used by the tagging service

// Tagging behaviour
pub const TAGGING_MAX_TAG_LENGTH: &str = "TAGGING_MAX_TAG_LENGTH";
pub const TAGGING_FORCE_LOWERCASE_TAGS: &str = "TAGGING_FORCE_LOWERCASE_TAGS";

// Port Configuration
pub const TAGGING_API_PORT: &str = "TAGGING_API_PORT";
pub const TAGGING_API_HOST: &str = "TAGGING_API_HOST";
pub const PORT: &str = "PORT"; // Legacy

// CORS Configuration
pub const TAGGING_CORS_ORIGIN: &str = "TAGGING_CORS_ORIGIN";

// Storage
pub const TAGGING_DATABASE_PATH: &str = "TAGGING_DATABASE_PATH";

// Tagged-object list views served by `tagging serve`
pub const TAGGING_LIST_MODELS: &str = "TAGGING_LIST_MODELS";
pub const TAGGING_PAGINATE_BY: &str = "TAGGING_PAGINATE_BY";
