#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Any parse success must describe a case that validates, renders, and
    // parses back to itself.
    if let Ok(case) = ms_case::parse_input(text) {
        case.validate().expect("parsed cases are valid");
        let rendered = ms_case::render_input(&case);
        let reparsed = ms_case::parse_input(&rendered).expect("rendered cases reparse");
        assert_eq!(reparsed, case);
    }
});
