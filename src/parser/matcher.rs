//! Fixed-pattern byte search.
//!
//! Boyer–Moore–Horspool over raw bytes: one bad-character shift table built
//! per needle, then a left-to-right scan of the haystack. Needles may contain
//! NUL bytes (the container footer marker ends in one).

/// A compiled needle with its bad-character shift table.
#[derive(Debug, Clone)]
pub struct MarkerSearch<'n> {
    needle: &'n [u8],
    shift: [usize; 256],
}

impl<'n> MarkerSearch<'n> {
    /// Build the shift table for `needle`.
    ///
    /// Every byte value shifts by the full needle length unless it occurs in
    /// the needle before the last position, in which case it shifts to align
    /// its last such occurrence.
    pub fn new(needle: &'n [u8]) -> Self {
        let len = needle.len();
        let mut shift = [len.max(1); 256];
        if len > 1 {
            for (i, &b) in needle[..len - 1].iter().enumerate() {
                shift[b as usize] = len - 1 - i;
            }
        }
        Self { needle, shift }
    }

    /// Iterate over every match offset in `haystack`, strictly increasing.
    ///
    /// Overlapping occurrences are all reported.
    pub fn find_iter<'h>(&'h self, haystack: &'h [u8]) -> Matches<'h, 'n> {
        Matches {
            search: self,
            haystack,
            pos: 0,
        }
    }

    /// Collect all match offsets.
    pub fn find_all(&self, haystack: &[u8]) -> Vec<usize> {
        self.find_iter(haystack).collect()
    }

    /// Offset of the last match, if any.
    pub fn find_last(&self, haystack: &[u8]) -> Option<usize> {
        self.find_iter(haystack).last()
    }
}

/// Iterator over match offsets, produced by [`MarkerSearch::find_iter`].
#[derive(Debug)]
pub struct Matches<'h, 'n> {
    search: &'h MarkerSearch<'n>,
    haystack: &'h [u8],
    pos: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let needle = self.search.needle;
        let n = needle.len();
        let hay = self.haystack;

        // An empty needle never matches.
        if n == 0 {
            return None;
        }

        while self.pos + n <= hay.len() {
            let window = &hay[self.pos..self.pos + n];
            let last = window[n - 1];
            if last == needle[n - 1] && window == needle {
                let found = self.pos;
                self.pos += 1;
                return Some(found);
            }
            self.pos += self.search.shift[last as usize];
        }
        None
    }
}

/// All starting offsets of `needle` in `haystack`.
pub fn search(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    MarkerSearch::new(needle).find_all(haystack)
}
