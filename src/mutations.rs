use crate::{Node, NodeIdx, OffsetTree, TreeError};

impl OffsetTree {
    /// Add `d_off` / `d_lnum` to the absolute offset and line number of
    /// every node whose line number is >= the target's, leaving every other
    /// node untouched.
    ///
    /// A node's absolute values are the sum of the relative fields along its
    /// root path, so only a handful of fields need correcting: the target's
    /// left child (which must stay put), and one node per direction change
    /// on the climb from the target to the root. The climb runs on the
    /// parent links and needs no stack.
    fn shift_at(&mut self, target: NodeIdx, d_off: i128, d_lnum: i64) {
        // The target's left subtree sits strictly below the shifted range.
        let left = self[target].left;
        if left.exists() {
            let l = &mut self[left];
            l.r_off -= d_off;
            l.r_lnum -= d_lnum;
        }

        // Climb to the root. from_left starts true: we pretend we arrived at
        // the target from a virtual child on its lower side.
        let mut from_left = true;
        let mut idx = target;
        loop {
            let parent = self[idx].parent;
            if !parent.exists() {
                break;
            }
            if self[parent].left == idx {
                if !from_left {
                    // idx's right subtree holds lines strictly between idx
                    // and the target; it must not move.
                    let n = &mut self[idx];
                    n.r_off -= d_off;
                    n.r_lnum -= d_lnum;
                }
                from_left = true;
            } else {
                if from_left {
                    let n = &mut self[idx];
                    n.r_off += d_off;
                    n.r_lnum += d_lnum;
                }
                from_left = false;
            }
            idx = parent;
        }

        // idx is now the root.
        if from_left {
            let n = &mut self[idx];
            n.r_off += d_off;
            n.r_lnum += d_lnum;
        }
    }

    /// Shared precondition check + shift for incr/decr.
    fn shift_lines(&mut self, lnum: u32, delta: i128) -> Result<(), TreeError> {
        if lnum == 0 || lnum >= self.len {
            return Err(TreeError::IndexOutOfBound);
        }
        if delta != 0 {
            let (idx, _) = self.find(lnum);
            self.shift_at(idx, delta, 0);
        }
        Ok(())
    }

    /// Set line `lnum`'s start byte to `new_off`. The delta propagates:
    /// every later line shifts by the same amount. Lines before `lnum` are
    /// untouched, and line 0 is pinned at offset 0, so it can't be set.
    ///
    /// The tree does not check that `new_off` stays above the previous
    /// line's start; keeping offsets monotone is the caller's business.
    pub fn set(&mut self, lnum: u32, new_off: u64) -> Result<(), TreeError> {
        if lnum == 0 || lnum >= self.len {
            return Err(TreeError::IndexOutOfBound);
        }
        let (idx, cur) = self.find(lnum);
        let delta = new_off as i128 - cur as i128;
        if delta != 0 {
            self.shift_at(idx, delta, 0);
        }
        Ok(())
    }

    /// Shift line `lnum` and every later line along by `delta` bytes.
    pub fn incr(&mut self, lnum: u32, delta: i64) -> Result<(), TreeError> {
        self.shift_lines(lnum, delta as i128)
    }

    /// `incr` with the delta negated.
    pub fn decr(&mut self, lnum: u32, delta: i64) -> Result<(), TreeError> {
        self.shift_lines(lnum, -(delta as i128))
    }

    /// Open a new line after line `lnum`. The new line steals the next
    /// line's current start byte, and the next line (with everything after
    /// it) moves along by one; appending after the last line instead starts
    /// the new line one byte past it.
    pub fn insert_after(&mut self, lnum: u32) -> Result<(), TreeError> {
        if lnum >= self.len {
            return Err(TreeError::IndexOutOfBound);
        }

        let new_lnum = lnum + 1;
        let new_off = if new_lnum < self.len {
            let (next, off) = self.find(new_lnum);
            self.shift_at(next, 1, 1);
            off
        } else {
            self.find(lnum).1 + 1
        };

        self.insert_node(new_lnum, new_off);
        self.len += 1;
        Ok(())
    }

    /// BST-insert a fresh node at absolute (lnum, off), then rebalance the
    /// insertion path. No live node may hold `lnum` when this is called.
    fn insert_node(&mut self, lnum: u32, off: u64) {
        let target = lnum as i64;
        let mut idx = self.root;
        let mut acc_lnum: i64 = 0;
        let mut acc_off: i128 = 0;

        let (parent, parent_off, parent_lnum, went_left) = loop {
            let node = &self[idx];
            acc_lnum += node.r_lnum;
            acc_off += node.r_off;
            if target < acc_lnum {
                if node.left.exists() {
                    idx = node.left;
                } else {
                    break (idx, acc_off, acc_lnum, true);
                }
            } else {
                debug_assert_ne!(target, acc_lnum);
                if node.right.exists() {
                    idx = node.right;
                } else {
                    break (idx, acc_off, acc_lnum, false);
                }
            }
        };

        let new = self.alloc_node(Node {
            r_off: off as i128 - parent_off,
            r_lnum: target - parent_lnum,
            height: 1,
            left: NodeIdx::default(),
            right: NodeIdx::default(),
            parent,
        });
        if went_left {
            self[parent].left = new;
        } else {
            self[parent].right = new;
        }
        self.rebalance_path(parent);
    }

    /// Remove line `lnum`. Every later line renumbers down by one and its
    /// offset drops by the removed line's width. Line 0 can't be removed.
    pub fn remove(&mut self, lnum: u32) -> Result<(), TreeError> {
        if lnum == 0 || lnum >= self.len {
            return Err(TreeError::IndexOutOfBound);
        }

        let (victim, off) = self.find(lnum);
        if lnum + 1 < self.len {
            let (next, next_off) = self.find(lnum + 1);
            let width = next_off as i128 - off as i128;
            // After this shift the old line lnum+1 briefly shares the
            // victim's line number and offset. Unlinking the victim below
            // restores uniqueness; nothing observes the tree in between.
            self.shift_at(next, -width, -1);
        }

        self.unlink_node(victim);
        self.free_node(victim);
        self.len -= 1;
        Ok(())
    }

    /// Detach `victim` from the tree, preserving every other node's absolute
    /// offset and line number, then rebalance from the detach point.
    fn unlink_node(&mut self, victim: NodeIdx) {
        let Node { r_off, r_lnum, left, right, parent, .. } = self[victim];

        if !left.exists() || !right.exists() {
            // Splice the at-most-one child into the victim's place. The
            // child's new parent sits at the other end of the removed edge,
            // so it absorbs the victim's relative fields.
            let child = if left.exists() { left } else { right };
            if child.exists() {
                let c = &mut self[child];
                c.parent = parent;
                c.r_off += r_off;
                c.r_lnum += r_lnum;
            }
            self.relink_child(parent, victim, child);
            if parent.exists() {
                self.rebalance_path(parent);
            }
            return;
        }

        // Two children: transplant the in-order successor (leftmost node of
        // the right subtree; it has no left child) into the victim's place.
        // d_off / d_lnum measure successor-minus-victim in absolute terms;
        // every corrected field below derives from that difference.
        let mut d_off = self[right].r_off;
        let mut d_lnum = self[right].r_lnum;
        let mut succ = right;
        while self[succ].left.exists() {
            succ = self[succ].left;
            d_off += self[succ].r_off;
            d_lnum += self[succ].r_lnum;
        }

        let rebalance_from = if succ == right {
            succ
        } else {
            // Splice the successor out of its old spot; its right child (if
            // any) takes its place there.
            let succ_parent = self[succ].parent;
            let succ_right = self[succ].right;
            let (s_off, s_lnum) = (self[succ].r_off, self[succ].r_lnum);
            if succ_right.exists() {
                let c = &mut self[succ_right];
                c.parent = succ_parent;
                c.r_off += s_off;
                c.r_lnum += s_lnum;
            }
            self[succ_parent].left = succ_right;

            // The victim's whole right subtree hangs under the successor.
            self[succ].right = right;
            self[right].parent = succ;
            let r = &mut self[right];
            r.r_off -= d_off;
            r.r_lnum -= d_lnum;
            succ_parent
        };

        // In both shapes the victim's left subtree and parent slot transfer
        // to the successor.
        self[succ].left = left;
        self[left].parent = succ;
        let l = &mut self[left];
        l.r_off -= d_off;
        l.r_lnum -= d_lnum;

        self[succ].parent = parent;
        self.relink_child(parent, victim, succ);
        let s = &mut self[succ];
        s.r_off = r_off + d_off;
        s.r_lnum = r_lnum + d_lnum;

        // The rebalancing climb passes through the successor, refreshing
        // its height on the way to the root.
        self.rebalance_path(rebalance_from);
    }
}
