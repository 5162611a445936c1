//! Shared building blocks for hostlink integrations: config bootstrap and
//! logging setup.

pub mod config_store;
pub mod logging;

pub use config_store::{load_or_create, ConfigError, ConfigStore};

/// Render an error and its `source()` chain as `outer: inner: root`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("attach failed")]
    struct Outer {
        #[source]
        source: io::Error,
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = Outer {
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(error_chain(&err), "attach failed: no such file");
    }

    #[test]
    fn test_error_chain_single_error() {
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(error_chain(&err), "boom");
    }
}
