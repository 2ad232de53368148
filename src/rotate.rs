use crate::{NodeIdx, OffsetTree};

// AVL machinery: cached heights, the two primitive rotations, and the upward
// rebalancing walk. Rotations rewire child links and re-encode the relative
// offset / line number fields in one step, so no node's absolute values ever
// change across a rotation.

impl OffsetTree {
    pub(crate) fn height_of(&self, idx: NodeIdx) -> u8 {
        if idx.exists() { self[idx].height } else { 0 }
    }

    pub(crate) fn balance_factor(&self, idx: NodeIdx) -> i32 {
        let node = &self[idx];
        self.height_of(node.left) as i32 - self.height_of(node.right) as i32
    }

    /// Refresh a node's cached height from its children's.
    pub(crate) fn fix_height(&mut self, idx: NodeIdx) {
        let node = &self[idx];
        let h = self.height_of(node.left).max(self.height_of(node.right)) + 1;
        self[idx].height = h;
    }

    /// Swap `parent`'s child link `old` for `new`. A null parent means `old`
    /// was the root.
    pub(crate) fn relink_child(&mut self, parent: NodeIdx, old: NodeIdx, new: NodeIdx) {
        if parent.exists() {
            let p = &mut self[parent];
            if p.left == old {
                p.left = new;
            } else {
                debug_assert_eq!(p.right, old);
                p.right = new;
            }
        } else {
            debug_assert_eq!(self.root, old);
            self.root = new;
        }
    }

    /// Right-rotate the subtree at `x`, pivoting on its left child. Returns
    /// the new subtree root.
    ///
    /// The pivot's inner child moves from under the pivot to under `x` -
    /// the other end of the old edge - so it absorbs the pivot's relative
    /// fields. `x` becomes the pivot's child across the same edge reversed,
    /// and the pivot takes over `x`'s place under the old parent.
    pub(crate) fn rotate_right(&mut self, x: NodeIdx) -> NodeIdx {
        let y = self[x].left;
        debug_assert!(y.exists(), "right rotation without a left child");
        let beta = self[y].right;

        let (y_off, y_lnum) = (self[y].r_off, self[y].r_lnum);
        let (x_off, x_lnum) = (self[x].r_off, self[x].r_lnum);

        let parent = self[x].parent;
        self.relink_child(parent, x, y);
        self[y].parent = parent;

        self[y].right = x;
        self[x].parent = y;
        self[x].left = beta;
        if beta.exists() {
            let b = &mut self[beta];
            b.parent = x;
            b.r_off += y_off;
            b.r_lnum += y_lnum;
        }

        self[x].r_off = -y_off;
        self[x].r_lnum = -y_lnum;
        self[y].r_off = y_off + x_off;
        self[y].r_lnum = y_lnum + x_lnum;

        self.fix_height(x);
        self.fix_height(y);
        y
    }

    /// Mirror of rotate_right: left-rotate at `x`, pivoting on its right
    /// child. The relative re-encoding is the same formula; only the links
    /// mirror.
    pub(crate) fn rotate_left(&mut self, x: NodeIdx) -> NodeIdx {
        let y = self[x].right;
        debug_assert!(y.exists(), "left rotation without a right child");
        let beta = self[y].left;

        let (y_off, y_lnum) = (self[y].r_off, self[y].r_lnum);
        let (x_off, x_lnum) = (self[x].r_off, self[x].r_lnum);

        let parent = self[x].parent;
        self.relink_child(parent, x, y);
        self[y].parent = parent;

        self[y].left = x;
        self[x].parent = y;
        self[x].right = beta;
        if beta.exists() {
            let b = &mut self[beta];
            b.parent = x;
            b.r_off += y_off;
            b.r_lnum += y_lnum;
        }

        self[x].r_off = -y_off;
        self[x].r_lnum = -y_lnum;
        self[y].r_off = y_off + x_off;
        self[y].r_lnum = y_lnum + x_lnum;

        self.fix_height(x);
        self.fix_height(y);
        y
    }

    /// Climb from `start` to the root, refreshing cached heights and fixing
    /// any AVL violation with the standard LL / RR / LR / RL rotations.
    /// Deletions can leave violations arbitrarily far up the path, so the
    /// walk never stops early.
    pub(crate) fn rebalance_path(&mut self, start: NodeIdx) {
        let mut idx = start;
        while idx.exists() {
            self.fix_height(idx);
            let bf = self.balance_factor(idx);
            let subtree_root = if bf > 1 {
                let left = self[idx].left;
                if self.balance_factor(left) < 0 {
                    self.rotate_left(left);
                }
                self.rotate_right(idx)
            } else if bf < -1 {
                let right = self[idx].right;
                if self.balance_factor(right) > 0 {
                    self.rotate_right(right);
                }
                self.rotate_left(idx)
            } else {
                idx
            };
            idx = self[subtree_root].parent;
        }
    }
}
