//! Tests for identifier and priority value types.

use crate::task::domain::{InvalidArgumentError, Priority};
use rstest::rstest;

#[rstest]
#[case(0)]
#[case(500)]
#[case(1000)]
fn priorities_in_range_deserialize(#[case] value: u16) {
    let priority: Priority = serde_json::from_str(&value.to_string()).expect("priority in range");

    assert_eq!(priority.value(), value);
    assert_eq!(
        serde_json::to_string(&priority).expect("priority serializes"),
        value.to_string()
    );
}

#[rstest]
fn out_of_range_priorities_are_rejected_on_load() {
    let result = serde_json::from_str::<Priority>("1001");

    let err = result.expect_err("priority above the maximum");
    assert!(
        err.to_string().contains("out of range"),
        "unexpected error: {err}"
    );
    assert_eq!(
        Priority::try_from(1001),
        Err(InvalidArgumentError::PriorityOutOfRange(1001))
    );
}
