//! Infrastructure layer constants

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "scenedi.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "scenedi";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "SCENEDI";

/// Separator for nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_ENV_FILTER: &str = "SCENEDI_LOG";

/// File stem for rotated log files
pub const LOG_FILE_STEM: &str = "scenedi";

// ============================================================================
// CONTAINER CONSTANTS
// ============================================================================

/// Name given to containers built without one
pub const DEFAULT_CONTAINER_NAME: &str = "container";

/// Default name of the demo's root container
pub const DEFAULT_ROOT_CONTAINER_NAME: &str = "root";

/// Default name of the demo's screen container
pub const DEFAULT_SCREEN_CONTAINER_NAME: &str = "screen";

// ============================================================================
// DEMO CONSTANTS
// ============================================================================

/// Images the demo spawns
pub const DEFAULT_DEMO_IMAGE_COUNT: usize = 5;

/// Images the demo removes again
pub const DEFAULT_DEMO_REMOVALS: usize = 3;

/// Lifetime tag of the demo palette
pub const DEFAULT_DEMO_PALETTE_LIFETIME: &str = "shared";
