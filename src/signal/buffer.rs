use std::collections::VecDeque;
use crate::signal::SignalError;
/// Number of points every dashboard window holds.
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;
/// Fixed-capacity rolling window: appending past capacity evicts the oldest entry.
#[derive(Clone, Debug)]
pub struct Window<T> {
    items: VecDeque<T>,
    capacity: usize,
}
impl<T> Window<T> {
    pub fn with_capacity(capacity: usize) -> Result<Self, SignalError> {
        if capacity == 0 {
            return Err(SignalError::InvalidCapacity);
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }
    /// Append `item`, returning the evicted oldest entry when the window was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }
    pub fn first(&self) -> Option<&T> {
        self.items.front()
    }
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }
    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }
}
impl<T: Clone> Window<T> {
    /// Plain ordered copy, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
impl<T> Extend<T> for Window<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;
    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            Window::<f64>::with_capacity(0),
            Err(SignalError::InvalidCapacity)
        ));
    }
    #[test]
    fn length_never_exceeds_capacity() {
        let mut window = Window::with_capacity(DEFAULT_WINDOW_CAPACITY).unwrap();
        for i in 0..250 {
            window.push(i);
            assert!(window.len() <= DEFAULT_WINDOW_CAPACITY);
            if i + 1 >= DEFAULT_WINDOW_CAPACITY {
                assert_eq!(window.len(), DEFAULT_WINDOW_CAPACITY);
            }
        }
    }
    #[test]
    fn appending_to_full_window_evicts_oldest() {
        let mut window = Window::with_capacity(100).unwrap();
        window.extend((0..100).map(|i| Sample::new(i, i as f64)));
        assert!(window.is_full());
        let newest = Sample::new(100, 42.0);
        let evicted = window.push(newest);
        assert_eq!(evicted, Some(Sample::new(0, 0.0)));
        assert_eq!(window.len(), 100);
        assert_eq!(window.first(), Some(&Sample::new(1, 1.0)));
        assert_eq!(window.last(), Some(&newest));
        assert!(window.iter().all(|s| s.timestamp != 0));
    }
    #[test]
    fn to_vec_is_oldest_first() {
        let mut window = Window::with_capacity(3).unwrap();
        window.extend([1, 2, 3, 4]);
        assert_eq!(window.to_vec(), vec![2, 3, 4]);
    }
}
