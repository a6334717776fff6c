use quill::shared::time::{Duration, Time};

#[test]
fn valid_time_test_1() {
    let time = "00:00:00";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 0);
}

#[test]
fn valid_time_test_2() {
    let time = "00:01:30";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 90);
}

#[test]
fn valid_time_test_3() {
    let time = "25:01:30";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 90_090);
}

#[test]
fn invalid_time_test_1() {
    let time = "00:00:0a";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn invalid_time_test_2() {
    let time = "00:00";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn invalid_time_test_3() {
    let time = "08:61:00";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn format_time_test() {
    assert_eq!(Time::from_seconds(3690).to_hms_string(), "01:01:30");
    assert_eq!(Time::from_seconds(-90).to_hms_string(), "-00:01:30");
}

#[test]
fn humanize_test() {
    assert_eq!(Duration::from_seconds(10).humanize(), "a few seconds");
    assert_eq!(Duration::from_seconds(60).humanize(), "a minute");
    assert_eq!(Duration::from_minutes(12).humanize(), "12 minutes");
    assert_eq!(Duration::from_minutes(60).humanize(), "an hour");
    assert_eq!(Duration::from_hours(5).humanize(), "5 hours");
    assert_eq!(Duration::from_hours(30).humanize(), "a day");
    assert_eq!(Duration::from_hours(72).humanize(), "3 days");
}
