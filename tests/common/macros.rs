/// Asserts that two floats agree within `eps` (default 1e-9).
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        let (l, r): (f64, f64) = ($left, $right);
        assert!(
            (l - r).abs() <= 1e-9,
            "{} = {} is not equal to {}",
            stringify!($left),
            l,
            r
        );
    };
    ($left:expr, $right:expr, $eps:expr) => {
        let (l, r): (f64, f64) = ($left, $right);
        assert!(
            (l - r).abs() <= $eps,
            "{} = {} is not within {} of {}",
            stringify!($left),
            l,
            $eps,
            r
        );
    };
}

/// Asserts that a value lies in [0, 1] and is not NaN.
#[macro_export]
macro_rules! assert_unit {
    ($value:expr) => {
        let v: f64 = $value;
        assert!(
            (0.0..=1.0).contains(&v),
            "{} = {} is outside [0, 1]",
            stringify!($value),
            v
        );
    };
}

/// Asserts that a `qcsim_io` result failed with the given error kind.
#[macro_export]
macro_rules! assert_io_kind {
    ($result:expr, $kind:expr) => {
        match $result {
            Ok(_) => panic!("expected {:?} error, got Ok", $kind),
            Err(e) => assert_eq!(e.kind(), $kind, "unexpected error: {}", e),
        }
    };
}
