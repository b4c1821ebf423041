use axum::{response::Result, Json};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub async fn health_check() -> Result<Json<Value>> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();

    Ok(Json(json!({
        "status": "healthy",
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tagging-api"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let value = health_check().await.unwrap().0;

        assert_eq!(
            value.get("status").and_then(|v| v.as_str()),
            Some("healthy")
        );
        assert_eq!(
            value.get("service").and_then(|v| v.as_str()),
            Some("tagging-api")
        );
        assert!(value.get("version").is_some());
        // Timestamp should be reasonable (after year 2020)
        assert!(value["timestamp"].as_u64().unwrap() > 1577836800);
    }
}
