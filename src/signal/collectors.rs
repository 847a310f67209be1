/*!
 * Collectors
 * Aggregation strategies over slot return values
 */

/// Aggregates the return values of an emission, in slot visit order.
///
/// A fresh collector is default-constructed per emission; override the
/// signal's collector for a single call with
/// [`invoke`](crate::signal::Signal::invoke).
pub trait Collector<R>: Default {
    /// Aggregate result handed back from the emission.
    type Output;

    /// Feed one slot return value.
    fn collect(&mut self, value: R);

    /// Consume the collector into its result.
    fn finish(self) -> Self::Output;
}

/// Keeps the first value seen; `None` when no slot produced one.
pub struct First<R> {
    current: Option<R>,
}

impl<R> Default for First<R> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<R> Collector<R> for First<R> {
    type Output = Option<R>;

    fn collect(&mut self, value: R) {
        if self.current.is_none() {
            self.current = Some(value);
        }
    }

    fn finish(self) -> Option<R> {
        self.current
    }
}

/// Keeps the latest value seen.
pub struct Last<R> {
    current: Option<R>,
}

impl<R> Default for Last<R> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<R> Collector<R> for Last<R> {
    type Output = Option<R>;

    fn collect(&mut self, value: R) {
        self.current = Some(value);
    }

    fn finish(self) -> Option<R> {
        self.current
    }
}

/// Keeps the smallest value seen.
pub struct Minimum<R> {
    current: Option<R>,
}

impl<R> Default for Minimum<R> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<R: PartialOrd> Collector<R> for Minimum<R> {
    type Output = Option<R>;

    fn collect(&mut self, value: R) {
        match &self.current {
            Some(current) if value >= *current => {}
            _ => self.current = Some(value),
        }
    }

    fn finish(self) -> Option<R> {
        self.current
    }
}

/// Keeps the largest value seen.
pub struct Maximum<R> {
    current: Option<R>,
}

impl<R> Default for Maximum<R> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<R: PartialOrd> Collector<R> for Maximum<R> {
    type Output = Option<R>;

    fn collect(&mut self, value: R) {
        match &self.current {
            Some(current) if value <= *current => {}
            _ => self.current = Some(value),
        }
    }

    fn finish(self) -> Option<R> {
        self.current
    }
}

/// Collects every value in emission order.
pub struct Range<R> {
    values: Vec<R>,
}

impl<R> Default for Range<R> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<R> Collector<R> for Range<R> {
    type Output = Vec<R>;

    fn collect(&mut self, value: R) {
        self.values.push(value);
    }

    fn finish(self) -> Vec<R> {
        self.values
    }
}

/// The signal's default collector: the last value seen, `None` when no
/// slot ran.
pub struct DefaultCollector<R> {
    current: Option<R>,
}

impl<R> Default for DefaultCollector<R> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<R> Collector<R> for DefaultCollector<R> {
    type Output = Option<R>;

    fn collect(&mut self, value: R) {
        self.current = Some(value);
    }

    fn finish(self) -> Option<R> {
        self.current
    }
}
