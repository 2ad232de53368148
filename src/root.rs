use crate::scan::line_starts;
use crate::{Node, NodeIdx, OffsetTree, TreeError};

impl OffsetTree {
    /// Index a UTF-8 buffer. Fails on invalid UTF-8 and refuses empty
    /// buffers; any non-empty buffer has at least line 0 at offset 0.
    pub fn new(bytes: &[u8]) -> Result<Self, TreeError> {
        let starts = line_starts(bytes)?;
        Self::from_line_starts(&starts)
    }

    /// Build a tree from an ascending array of line-start offsets, the first
    /// of which must be 0. This costs O(n) and the result is perfectly
    /// balanced; bulk construction never routes through insert_after.
    pub fn from_line_starts(starts: &[u64]) -> Result<Self, TreeError> {
        if starts.is_empty() {
            return Err(TreeError::EmptyBuffer);
        }
        debug_assert_eq!(starts[0], 0);
        debug_assert!(starts.windows(2).all(|w| w[0] < w[1]));

        let mut tree = OffsetTree {
            nodes: Vec::with_capacity(starts.len()),
            free_head: NodeIdx::default(),
            root: NodeIdx::default(),
            len: starts.len() as u32,
        };
        tree.root = tree.build_balanced(starts, 0, starts.len(), NodeIdx::default(), 0, 0);
        Ok(tree)
    }

    /// Median-split construction over starts[lo..hi). parent_off and
    /// parent_lnum are the parent's absolute values; each created node
    /// records itself relative to them.
    fn build_balanced(
        &mut self,
        starts: &[u64],
        lo: usize,
        hi: usize,
        parent: NodeIdx,
        parent_off: i128,
        parent_lnum: i64,
    ) -> NodeIdx {
        if lo >= hi {
            return NodeIdx::default();
        }
        let mid = (lo + hi) / 2;
        let off = starts[mid] as i128;
        let lnum = mid as i64;

        let idx = self.alloc_node(Node {
            r_off: off - parent_off,
            r_lnum: lnum - parent_lnum,
            height: 1,
            left: NodeIdx::default(),
            right: NodeIdx::default(),
            parent,
        });

        let left = self.build_balanced(starts, lo, mid, idx, off, lnum);
        let right = self.build_balanced(starts, mid + 1, hi, idx, off, lnum);
        self[idx].left = left;
        self[idx].right = right;
        self.fix_height(idx);
        idx
    }

    /// The absolute byte offset at which line `lnum` starts.
    pub fn get(&self, lnum: u32) -> Result<u64, TreeError> {
        if lnum >= self.len {
            return Err(TreeError::IndexOutOfBound);
        }
        let (_, off) = self.find(lnum);
        Ok(off)
    }

    /// Descend to the node for line `lnum`, which must be present. Returns
    /// the node's index and its absolute byte offset.
    pub(crate) fn find(&self, lnum: u32) -> (NodeIdx, u64) {
        let target = lnum as i64;
        let mut idx = self.root;
        let mut acc_lnum: i64 = 0;
        let mut acc_off: i128 = 0;

        while idx.exists() {
            let node = &self[idx];
            acc_lnum += node.r_lnum;
            acc_off += node.r_off;
            if acc_lnum == target {
                debug_assert!(acc_off >= 0);
                return (idx, acc_off as u64);
            }
            idx = if acc_lnum < target { node.right } else { node.left };
        }
        // Every lnum < len is present in a well-formed tree.
        panic!("line {} missing from a tree of {} lines", lnum, self.len);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn init_counts_lines() {
        let tree = OffsetTree::new(b"const\nvar\n").unwrap();
        tree.dbg_check();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(0).unwrap(), 0);
        assert_eq!(tree.get(1).unwrap(), 6);
        assert_eq!(tree.get(2).unwrap(), 10);
    }

    #[test]
    fn init_larger_buffer() {
        let tree = OffsetTree::new(b"\nzig\nc\nrust\ncpp\n").unwrap();
        tree.dbg_check();
        assert_eq!(tree.len(), 6);
        let expected = [0u64, 1, 5, 7, 12, 16];
        for (k, &off) in expected.iter().enumerate() {
            assert_eq!(tree.get(k as u32).unwrap(), off);
        }
    }

    #[test]
    fn single_line_buffer() {
        let tree = OffsetTree::new(b"hello").unwrap();
        tree.dbg_check();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(0).unwrap(), 0);
        assert!(matches!(tree.get(1), Err(TreeError::IndexOutOfBound)));
    }

    #[test]
    fn empty_buffer_is_refused() {
        assert!(matches!(
            OffsetTree::new(b""),
            Err(TreeError::EmptyBuffer)
        ));
        assert!(matches!(
            OffsetTree::from_line_starts(&[]),
            Err(TreeError::EmptyBuffer)
        ));
    }

    #[test]
    fn invalid_utf8_is_refused() {
        assert!(matches!(
            OffsetTree::new(&[0xc3, 0x28]),
            Err(TreeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn bulk_build_is_balanced() {
        // 1000 lines, 4 bytes each. A perfectly balanced tree of n nodes
        // has height ceil(log2(n + 1)).
        let starts: Vec<u64> = (0..1000u64).map(|i| i * 4).collect();
        let tree = OffsetTree::from_line_starts(&starts).unwrap();
        tree.dbg_check();
        assert_eq!(tree.len(), 1000);
        assert_eq!(tree[tree.root].height, 10);

        for (k, &off) in starts.iter().enumerate() {
            assert_eq!(tree.get(k as u32).unwrap(), off);
        }
    }

    #[test]
    fn get_past_the_end_fails() {
        let tree = OffsetTree::new(b"a\nb\n").unwrap();
        assert!(tree.get(3).is_err());
        assert!(tree.get(u32::MAX).is_err());
    }
}
