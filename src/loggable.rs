use std::fmt;
use std::sync::Arc;

/// A positional argument of a log record.
///
/// Arguments are rendered lazily: nothing is formatted until the record is
/// normalized, which captures the value as it is at emit time. This is
/// automatically implemented for all types that implement Display.
pub trait Loggable: Send + Sync {
    /// Renders the argument into its final text.
    fn render(&self) -> String;
}

impl<T> Loggable for T
where
    T: fmt::Display + Send + Sync + ?Sized,
{
    fn render(&self) -> String {
        self.to_string()
    }
}

/// Shared handle to an argument, cheap to clone between handlers.
pub type Arg = Arc<dyn Loggable>;

/// Wraps a value as a record argument.
pub fn arg<T: Loggable + 'static>(value: T) -> Arg {
    Arc::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_numeric_render() {
        assert_eq!(12345i32.render(), "12345");
        assert_eq!(3.14159f64.render(), "3.14159");
    }

    #[test]
    fn test_string_render() {
        assert_eq!("Hello".render(), "Hello");
        assert_eq!(String::from("world").render(), "world");
    }

    #[test]
    fn test_bool_render() {
        assert_eq!(true.render(), "true");
    }

    struct Counter(AtomicUsize);

    impl fmt::Display for Counter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "count={}", self.0.load(Ordering::SeqCst))
        }
    }

    #[test]
    fn test_render_is_deferred() {
        let counter = Arc::new(Counter(AtomicUsize::new(1)));
        let argument: Arg = counter.clone();
        counter.0.store(2, Ordering::SeqCst);
        assert_eq!(argument.render(), "count=2");
    }
}
