#![no_main]

use kimberlite_xacml_json::ContentEncoding;
use kimberlite_xacml_json::content::{decode, encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(root) = decode(raw) else {
        return;
    };

    for encoding in [ContentEncoding::Inline, ContentEncoding::Base64] {
        let encoded = encode(&root, encoding);
        let decoded = decode(&encoded).expect("encoded content must decode");
        assert_eq!(decoded, root);
    }
});
