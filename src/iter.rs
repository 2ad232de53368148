use crate::{NodeIdx, OffsetTree};

/// In-order iterator yielding `(line number, start offset)` pairs. Walks the
/// tree through the parent links, keeping running sums of the relative
/// fields so each yielded pair is absolute.
#[derive(Debug)]
pub struct OffsetTreeIter<'a> {
    tree: &'a OffsetTree,
    next: NodeIdx,
    lnum: i64,
    off: i128,
}

impl OffsetTree {
    /// Visit every line in order.
    pub fn iter(&self) -> OffsetTreeIter<'_> {
        // Descend the left spine to line 0, accumulating on the way down.
        let mut idx = self.root;
        let mut lnum = self[idx].r_lnum;
        let mut off = self[idx].r_off;
        while self[idx].left.exists() {
            idx = self[idx].left;
            lnum += self[idx].r_lnum;
            off += self[idx].r_off;
        }
        OffsetTreeIter { tree: self, next: idx, lnum, off }
    }

    /// All line starts in line order. Tests lean on this as the brute-force
    /// comparison walk.
    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().map(|(_, off)| off).collect()
    }
}

impl<'a> Iterator for OffsetTreeIter<'a> {
    type Item = (u32, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.exists() {
            return None;
        }
        let item = (self.lnum as u32, self.off as u64);

        // Step to the in-order successor. Descending adds the entered
        // node's relative fields; climbing removes the departed node's.
        let tree = self.tree;
        let mut idx = self.next;
        if tree[idx].right.exists() {
            idx = tree[idx].right;
            self.lnum += tree[idx].r_lnum;
            self.off += tree[idx].r_off;
            while tree[idx].left.exists() {
                idx = tree[idx].left;
                self.lnum += tree[idx].r_lnum;
                self.off += tree[idx].r_off;
            }
        } else {
            // Climb while we're a right child; the first parent reached
            // from its left side is the successor.
            loop {
                let parent = tree[idx].parent;
                let from_right = parent.exists() && tree[parent].right == idx;
                self.lnum -= tree[idx].r_lnum;
                self.off -= tree[idx].r_off;
                idx = parent;
                if !from_right {
                    break;
                }
            }
        }
        self.next = idx;
        Some(item)
    }
}
