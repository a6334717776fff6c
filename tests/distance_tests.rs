use quill::shared::geo::{Bounds, Coordinate, Distance};

#[test]
fn distance_test() {
    let coord_a = Coordinate {
        latitude: 48.85800943005911,
        longitude: 2.3514350059357927,
    };

    let coord_b = Coordinate {
        latitude: 51.5052389927712,
        longitude: -0.12495407345099824,
    };
    let d = coord_a.euclidean_distance(&coord_b);
    assert!((d.as_kilometers() - 343.0).abs() < 5.0);
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn within_degrees_test() {
    let origin = Coordinate::new(59.3293, 18.0686);
    assert!(origin.within_degrees(&Coordinate::new(59.3298, 18.0681), 0.0005));
    assert!(!origin.within_degrees(&Coordinate::new(59.3313, 18.0686), 0.0005));
}

#[test]
fn bounds_from_coordinates_test() {
    let coordinates = [
        Coordinate::new(59.3, 18.1),
        Coordinate::new(59.4, 18.0),
        Coordinate::new(59.35, 18.05),
    ];
    let bounds = Bounds::from_coordinates(&coordinates).unwrap();
    assert_eq!(bounds.north, 59.4);
    assert_eq!(bounds.south, 59.3);
    assert_eq!(bounds.east, 18.1);
    assert_eq!(bounds.west, 18.0);
    assert!(bounds.contains(&Coordinate::new(59.35, 18.05)));
    assert!(Bounds::from_coordinates(&Vec::<Coordinate>::new()).is_none());
}
