use backscroll::setup_logging;

#[test]
fn test_logging_setup() {
    // This test verifies that the logging setup function doesn't panic
    let result = std::panic::catch_unwind(|| {
        setup_logging();
    });

    assert!(result.is_ok(), "setup_logging function should not panic");
}

#[test]
fn test_logging_setup_twice() {
    // A second subscriber install must be ignored rather than panic
    setup_logging();
    let result = std::panic::catch_unwind(setup_logging);
    assert!(result.is_ok(), "setup_logging should tolerate repeated calls");
}
