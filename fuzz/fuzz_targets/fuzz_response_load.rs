#![no_main]

use kimberlite_xacml_json::{load_response, response_to_json};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(response) = load_response(text) else {
        return;
    };

    // Load and render apply the same consistency rules.
    let json = response_to_json(&response).expect("loaded response must render");
    let reloaded = load_response(&json).expect("rendered response must load");
    assert_eq!(reloaded.results.len(), response.results.len());
    for (before, after) in response.results.iter().zip(&reloaded.results) {
        assert_eq!(before.decision, after.decision);
        assert_eq!(before.status, after.status);
    }
});
