#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(case) = ms_case::parse_input(text) else {
        return;
    };

    let answer = ms_oracle::evaluate(&case.values, &case.queries)
        .expect("valid cases always evaluate");
    assert_eq!(answer.len(), case.queries.len());

    // Answers along a query set are sorted because ranks are increasing.
    assert!(answer.windows(2).all(|pair| pair[0] <= pair[1]));
});
