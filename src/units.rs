pub mod temperature {
    use crate::weather::Units;

    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    /// Provider values are always Celsius.
    pub fn display(temp_c: f64, units: Units) -> String {
        let temp = match units {
            Units::Metric => temp_c,
            Units::Imperial => c2f(temp_c),
        };
        format!("{temp:.0}°")
    }

    #[test]
    fn test_temperature() {
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
        assert_eq!(c2f(-40.0), -40.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(display(21.4, Units::Metric), "21°");
        assert_eq!(display(21.0, Units::Imperial), "70°");
    }
}
