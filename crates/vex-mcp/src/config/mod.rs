//! Configuration resolution.

/// Author used when neither the CLI nor the environment names one.
pub const DEFAULT_AUTHOR: &str = "vex-mcp";

/// Environment variable consulted for the default document author.
pub const AUTHOR_ENV: &str = "VEX_AUTHOR";

/// Resolve the default document author: explicit flag, then `VEX_AUTHOR`,
/// then [`DEFAULT_AUTHOR`].
pub fn resolve_default_author(explicit: Option<&str>) -> String {
    if let Some(author) = explicit.filter(|a| !a.trim().is_empty()) {
        return author.to_string();
    }

    if let Ok(env_author) = std::env::var(AUTHOR_ENV) {
        if !env_author.trim().is_empty() {
            return env_author;
        }
    }

    DEFAULT_AUTHOR.to_string()
}
