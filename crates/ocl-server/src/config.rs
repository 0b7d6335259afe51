//! Server configuration.
//!
//! Every option can be given as a command-line flag or through its
//! environment variable:
//! - `OCL_DB_PATH`: SQLite database file path, or `:memory:` for the
//!   in-memory backend (default: "ocl.db")
//! - `OCL_PORT`: Server listen port (default: 8000)
//! - `OCL_DEFAULT_PAGE_SIZE`: list page size when `limit` is absent (default: 25)
//! - `OCL_MAX_PAGE_SIZE`: upper bound for `limit` on lists (default: 500)
//! - `OCL_STAFF_USERS`: comma-separated user names with full access

use clap::Parser;

/// Database path that selects the in-memory backend.
pub const IN_MEMORY_DB: &str = ":memory:";

/// OCL source dictionary API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "ocl-server", about = "OCL source dictionary API server")]
pub struct ServerConfig {
    /// SQLite database file, or `:memory:` for a non-persistent store.
    #[arg(long, env = "OCL_DB_PATH", default_value = "ocl.db")]
    pub db_path: String,

    /// Port to listen on.
    #[arg(long, env = "OCL_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Page size for list endpoints when the request has no `limit`.
    #[arg(long, env = "OCL_DEFAULT_PAGE_SIZE", default_value_t = 25)]
    pub default_page_size: usize,

    /// Largest accepted `limit` on list endpoints.
    #[arg(long, env = "OCL_MAX_PAGE_SIZE", default_value_t = 500)]
    pub max_page_size: usize,

    /// Users treated as staff (bypass every permission check).
    #[arg(long, env = "OCL_STAFF_USERS", value_delimiter = ',')]
    pub staff_users: Vec<String>,
}

impl ServerConfig {
    pub fn is_staff(&self, username: &str) -> bool {
        self.staff_users.iter().any(|u| u == username)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            db_path: IN_MEMORY_DB.to_string(),
            port: 8000,
            default_page_size: 25,
            max_page_size: 500,
            staff_users: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let config = ServerConfig::parse_from([
            "ocl-server",
            "--db-path",
            ":memory:",
            "--port",
            "9001",
            "--staff-users",
            "root,admin",
        ]);
        assert_eq!(config.db_path, IN_MEMORY_DB);
        assert_eq!(config.port, 9001);
        assert!(config.is_staff("admin"));
        assert!(!config.is_staff("alice"));
        assert_eq!(config.listen_addr(), "0.0.0.0:9001");
    }

    #[test]
    fn default_config_is_in_memory() {
        let config = ServerConfig::default();
        assert_eq!(config.db_path, IN_MEMORY_DB);
        assert_eq!(config.default_page_size, 25);
    }
}
