//! User-Agent sent with every service and artifact request.

/// Default User-Agent (identifies the crate and its version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("ragflow-transfer/{version}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_crate_version() {
        let ua = default_user_agent();
        assert_eq!(
            ua.strip_prefix("ragflow-transfer/"),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }
}
