//! Вспомогательные функции и утилиты

use std::time::{Duration, Instant};

/// Измеряет время выполнения функции
pub fn measure_time<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let duration = start.elapsed();
    (result, duration)
}

/// Длительность в миллисекундах с дробной частью
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_time_returns_result_and_elapsed() {
        let (value, elapsed) = measure_time(|| {
            std::thread::sleep(Duration::from_millis(2));
            42
        });
        assert_eq!(value, 42);
        assert!(elapsed >= Duration::from_millis(2));
    }

    #[test]
    fn millis_keep_fraction() {
        assert_eq!(as_millis_f64(Duration::from_micros(1500)), 1.5);
    }
}
