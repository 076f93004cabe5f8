/// Ring buffer over the padded database stream.
///
/// Offset `0` is the oldest slot and offset `width - 1` the newest. Padding slots are `None` and
/// never match a query symbol; the stream is preceded by `width - 1` of them so that the first
/// step already sees `d[0]` at the newest offset.
#[derive(Debug, Clone)]
pub struct DatabaseWindow {
    slots: Vec<Option<u8>>,
    head: usize,
    /// Slots currently holding a database symbol
    real: usize,
}

impl DatabaseWindow {
    pub fn new(width: usize) -> Self {
        Self {
            slots: vec![None; width.max(1)],
            head: 0,
            real: 0,
        }
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.slots[(self.head + offset) % self.slots.len()]
    }

    /// Drops the oldest slot and appends `next` as the newest
    #[inline(always)]
    pub fn advance(&mut self, next: Option<u8>) {
        let dropped = std::mem::replace(&mut self.slots[self.head], next);
        self.real = self.real + next.is_some() as usize - dropped.is_some() as usize;
        self.head = (self.head + 1) % self.slots.len();
    }

    /// No database symbol is left in the window
    #[inline(always)]
    pub fn is_drained(&self) -> bool {
        self.real == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_shifts_towards_oldest() {
        let mut window = DatabaseWindow::new(3);
        window.advance(Some(b'A'));
        assert_eq!(
            (0..3).map(|i| window.get(i)).collect::<Vec<_>>(),
            vec![None, None, Some(b'A')]
        );

        window.advance(Some(b'C'));
        window.advance(Some(b'G'));
        assert_eq!(
            (0..3).map(|i| window.get(i)).collect::<Vec<_>>(),
            vec![Some(b'A'), Some(b'C'), Some(b'G')]
        );

        window.advance(None);
        assert_eq!(
            (0..3).map(|i| window.get(i)).collect::<Vec<_>>(),
            vec![Some(b'C'), Some(b'G'), None]
        );
    }

    #[test]
    fn test_window_drains() {
        let mut window = DatabaseWindow::new(2);
        assert!(window.is_drained());
        window.advance(Some(b'T'));
        assert!(!window.is_drained());
        window.advance(None);
        assert!(!window.is_drained());
        window.advance(None);
        assert!(window.is_drained());
    }
}
