//! config-rs/lib.rs
//! Shared configuration utilities for the oil diagnostics services
//! Provides environment loading and bind address resolution

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Load a `.env` file from the working directory, if one exists
///
/// Variables already present in the environment take precedence.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => log::debug!("No .env file found"),
        Err(err) => log::warn!("Failed to load .env file: {}", err),
    }
}

/// Get an environment variable, falling back to a default
pub fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get a non-empty environment variable
pub fn get_optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "OIL_DASHBOARD")
/// * `default_port` - The default port to use if not specified in environment
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    match env::var(&var_name) {
        Ok(value) => value.trim().parse::<u16>().unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        }),
        Err(_) => default_port,
    }
}

/// Create a SocketAddr for binding a service
///
/// `<NAME>_SERVICE_ADDR` may hold a full `host:port` (optionally prefixed
/// with `http://`); otherwise the service binds all interfaces on the port
/// from `get_service_port`.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        let trimmed = addr_str
            .trim()
            .trim_start_matches("http://")
            .trim_start_matches("https://");
        match trimmed.parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
}

/// Get default port for a specific service
pub fn get_default_port(service_name: &str) -> u16 {
    match service_name.to_uppercase().as_str() {
        "OIL_DASHBOARD" => 8000,
        "CLASSIFIER" => 8501,
        _ => 8100,
    }
}
