use std::fmt::*;

use crate::{NodeIdx, OffsetTree};

struct DebugStarts<'a>(&'a OffsetTree);

impl Debug for DebugStarts<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|(_, off)| off))
            .finish()
    }
}

impl Debug for OffsetTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffsetTree")
            .field("len", &self.len)
            .field("(starts)", &DebugStarts(self))
            .finish()
    }
}

// Debugging assertions over the whole structure. These walk every node, so
// they're for tests and fuzzing, never production paths. The fuzzer calls
// dbg_check after every operation to catch a broken invariant at the exact
// edit that introduced it.
impl OffsetTree {
    /// Assert every structural invariant: BST ordering and density of line
    /// numbers, line 0 pinned at offset 0, parent back-pointer consistency,
    /// cached heights, and AVL balance.
    #[allow(unused)]
    pub fn dbg_check(&self) {
        self.check_inner(true);
    }

    /// Like dbg_check, minus the balance and cached-height assertions.
    /// Rotation unit tests use this on trees they've deliberately skewed by
    /// hand, where ancestor heights go stale until a rebalancing walk runs.
    #[allow(unused)]
    pub(crate) fn dbg_check_no_balance(&self) {
        self.check_inner(false);
    }

    fn check_inner(&self, check_balance: bool) {
        assert!(self.len >= 1);
        assert!(self.root.exists());
        assert!(!self[self.root].parent.exists());

        let mut seen = 0u32;
        self.check_subtree(self.root, 0, 0, 0, self.len as i64, check_balance, &mut seen);
        // In-range + BST-distinct + the right count means the line numbers
        // are exactly {0 .. len-1}.
        assert_eq!(seen, self.len, "wrong number of live nodes");

        let (_, off) = self.find(0);
        assert_eq!(off, 0, "line 0 must start at offset 0");
    }

    /// Recursively check the subtree at `idx`, whose lines must fall in
    /// `lo..hi`. Returns the subtree height.
    #[allow(clippy::too_many_arguments)]
    fn check_subtree(
        &self,
        idx: NodeIdx,
        parent_lnum: i64,
        parent_off: i128,
        lo: i64,
        hi: i64,
        check_balance: bool,
        seen: &mut u32,
    ) -> u8 {
        let node = &self[idx];
        let lnum = parent_lnum + node.r_lnum;
        let off = parent_off + node.r_off;
        assert!(lo <= lnum && lnum < hi, "line {} escapes its subtree's range", lnum);
        assert!(off >= 0, "line {} has a negative offset", lnum);
        *seen += 1;

        let mut height_left = 0;
        let mut height_right = 0;
        if node.left.exists() {
            assert_eq!(self[node.left].parent, idx, "bad parent link under line {}", lnum);
            height_left =
                self.check_subtree(node.left, lnum, off, lo, lnum, check_balance, seen);
        }
        if node.right.exists() {
            assert_eq!(self[node.right].parent, idx, "bad parent link under line {}", lnum);
            height_right =
                self.check_subtree(node.right, lnum, off, lnum + 1, hi, check_balance, seen);
        }

        let height = height_left.max(height_right) + 1;
        if check_balance {
            let bf = height_left as i32 - height_right as i32;
            assert!(bf.abs() <= 1, "unbalanced at line {}", lnum);
            assert_eq!(node.height, height, "stale cached height at line {}", lnum);
        }
        height
    }
}

#[cfg(test)]
mod test {
    use crate::OffsetTree;

    #[test]
    fn debug_renders_the_starts() {
        let tree = OffsetTree::new(b"const\nvar\n").unwrap();
        let s = format!("{:?}", tree);
        assert!(s.contains("len: 3"));
        assert!(s.contains("[0, 6, 10]"));
    }
}
