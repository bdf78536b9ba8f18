//! `bfctl health` behavioral specs.

use crate::prelude::*;

#[test]
fn a_freshly_constructed_manager_is_healthy_and_idle() {
    let result = cli().args(["health"]).passes();
    similar_asserts::assert_eq!(
        result.json(),
        serde_json::json!({
            "healthy": true,
            "active_count": 0,
            "is_shutdown": false,
        })
    );
}
