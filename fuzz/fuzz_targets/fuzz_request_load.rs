#![no_main]

use kimberlite_xacml_json::{load_request, request_to_json};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Loading must never panic, whatever the input.
    let Ok(request) = load_request(text) else {
        return;
    };

    // Anything that loads renders, and the rendering loads back equivalent.
    let json = request_to_json(&request).expect("loaded request must render");
    let reloaded = load_request(&json).expect("rendered request must load");
    assert!(
        reloaded.is_equivalent(&request),
        "round trip changed the request:\n{json}"
    );
});
