//! Record of the cells visited during one render pass.

/// Fixed-size grid of visited flags.
#[derive(Debug, Clone)]
pub struct PrintedMap {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    count: usize,
}

impl PrintedMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
            count: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `(x, y)` has been printed. Out-of-range cells never are.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Mark `(x, y)` as printed. Returns `false` if it already was.
    ///
    /// Panics if the cell is outside the grid.
    pub fn insert(&mut self, x: usize, y: usize) -> bool {
        assert!(
            x < self.width && y < self.height,
            "cell ({}, {}) outside {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        let cell = &mut self.cells[y * self.width + x];
        if *cell {
            return false;
        }
        *cell = true;
        self.count += 1;
        true
    }

    /// Number of printed cells.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_complete(&self) -> bool {
        self.count == self.cells.len()
    }

    /// Unprinted cells in scan order (row by row, left to right).
    pub fn unprinted(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, printed)| !**printed)
            .map(move |(i, _)| (i % width, i / width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut map = PrintedMap::new(3, 2);
        assert!(!map.contains(1, 1));
        assert!(map.insert(1, 1));
        assert!(map.contains(1, 1));
        assert!(!map.insert(1, 1));
        assert_eq!(map.count(), 1);
    }

    #[test]
    fn test_out_of_range_is_not_printed() {
        let map = PrintedMap::new(2, 2);
        assert!(!map.contains(2, 0));
        assert!(!map.contains(0, 5));
    }

    #[test]
    fn test_unprinted_scan_order() {
        let mut map = PrintedMap::new(2, 2);
        map.insert(0, 0);
        map.insert(1, 1);
        assert_eq!(map.unprinted().collect::<Vec<_>>(), vec![(1, 0), (0, 1)]);
        map.insert(1, 0);
        map.insert(0, 1);
        assert!(map.is_complete());
    }

    #[test]
    #[should_panic]
    fn test_insert_outside_panics() {
        PrintedMap::new(1, 1).insert(1, 0);
    }
}
