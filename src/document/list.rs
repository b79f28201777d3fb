//! Persistent ordered sequence of paragraph handles
//!
//! Same path-copying discipline as the rope, applied to paragraph handles:
//! `set`, `push_back` and `splice` return a new list sharing every untouched
//! subtree, so unrelated paragraphs keep their identity across snapshots.

use std::sync::Arc;

use crate::document::ParaRef;

/// Persistent list of paragraph handles
#[derive(Clone)]
pub struct ParaList {
    root: Arc<ListNode>,
}

enum ListNode {
    Branch {
        left: Arc<ListNode>,
        right: Arc<ListNode>,
        /// Number of paragraphs in left subtree
        left_count: usize,
        /// Number of paragraphs in this subtree
        count: usize,
        height: usize,
    },
    Leaf(ParaRef),
    Empty,
}

impl Default for ParaList {
    fn default() -> Self {
        Self::new()
    }
}

impl ParaList {
    /// Create a new empty list
    pub fn new() -> Self {
        Self {
            root: Arc::new(ListNode::Empty),
        }
    }

    /// Create a list from a sequence of paragraphs
    pub fn from_paragraphs(paras: Vec<ParaRef>) -> Self {
        let leaves = paras
            .into_iter()
            .map(|p| Arc::new(ListNode::Leaf(p)))
            .collect();
        Self {
            root: Self::build_tree(leaves),
        }
    }

    /// Build a balanced tree from leaf nodes
    fn build_tree(mut nodes: Vec<Arc<ListNode>>) -> Arc<ListNode> {
        if nodes.is_empty() {
            return Arc::new(ListNode::Empty);
        }

        while nodes.len() > 1 {
            let mut new_nodes = Vec::with_capacity(nodes.len().div_ceil(2));

            for pair in nodes.chunks(2) {
                if pair.len() == 2 {
                    new_nodes.push(ListNode::branch(pair[0].clone(), pair[1].clone()));
                } else {
                    new_nodes.push(pair[0].clone());
                }
            }

            nodes = new_nodes;
        }

        nodes.remove(0)
    }

    /// Get the number of paragraphs
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the paragraph at the given index
    pub fn get(&self, index: usize) -> &ParaRef {
        assert!(
            index < self.len(),
            "paragraph index {index} out of range 0..{}",
            self.len()
        );
        self.root.get(index)
    }

    /// Replace the paragraph at the given index, returning the new list
    pub fn set(&self, index: usize, para: ParaRef) -> ParaList {
        assert!(
            index < self.len(),
            "paragraph index {index} out of range 0..{}",
            self.len()
        );
        ParaList {
            root: Self::set_node(&self.root, index, para),
        }
    }

    fn set_node(node: &Arc<ListNode>, index: usize, para: ParaRef) -> Arc<ListNode> {
        match &**node {
            ListNode::Empty => unreachable!("set past the end of the paragraph list"),
            ListNode::Leaf(_) => Arc::new(ListNode::Leaf(para)),
            ListNode::Branch {
                left,
                right,
                left_count,
                ..
            } => {
                if index < *left_count {
                    ListNode::branch(Self::set_node(left, index, para), right.clone())
                } else {
                    ListNode::branch(left.clone(), Self::set_node(right, index - left_count, para))
                }
            }
        }
    }

    /// Append a paragraph at the tail, returning the new list
    pub fn push_back(&self, para: ParaRef) -> ParaList {
        ParaList {
            root: ListNode::merge(self.root.clone(), Arc::new(ListNode::Leaf(para))),
        }
        .rebalanced()
    }

    /// Remove `[start, end)` and insert the given paragraphs at `start`
    pub fn splice(&self, start: usize, end: usize, paras: Vec<ParaRef>) -> ParaList {
        assert!(
            start <= end && end <= self.len(),
            "paragraph splice range {start}..{end} out of range 0..{}",
            self.len()
        );

        let (left, rest) = Self::split_node(&self.root, start);
        let (_, right) = Self::split_node(&rest, end - start);
        let middle = Self::build_tree(
            paras
                .into_iter()
                .map(|p| Arc::new(ListNode::Leaf(p)))
                .collect(),
        );

        ParaList {
            root: ListNode::merge(ListNode::merge(left, middle), right),
        }
        .rebalanced()
    }

    fn split_node(node: &Arc<ListNode>, at: usize) -> (Arc<ListNode>, Arc<ListNode>) {
        match &**node {
            ListNode::Empty => (Arc::new(ListNode::Empty), Arc::new(ListNode::Empty)),
            ListNode::Leaf(_) => {
                if at == 0 {
                    (Arc::new(ListNode::Empty), node.clone())
                } else {
                    (node.clone(), Arc::new(ListNode::Empty))
                }
            }
            ListNode::Branch {
                left,
                right,
                left_count,
                ..
            } => {
                if at <= *left_count {
                    let (ll, lr) = Self::split_node(left, at);
                    (ll, ListNode::merge(lr, right.clone()))
                } else {
                    let (rl, rr) = Self::split_node(right, at - left_count);
                    (ListNode::merge(left.clone(), rl), rr)
                }
            }
        }
    }

    /// Iterate over all paragraphs
    pub fn iter(&self) -> ParaIter<'_> {
        self.iter_range(0, self.len())
    }

    /// Iterate over paragraphs in `[start, end)`
    pub fn iter_range(&self, start: usize, end: usize) -> ParaIter<'_> {
        assert!(
            start <= end && end <= self.len(),
            "paragraph range {start}..{end} out of range 0..{}",
            self.len()
        );

        let mut iter = ParaIter {
            stack: Vec::new(),
            remaining: end - start,
        };
        iter.descend(&self.root, start);
        iter
    }

    /// Rebuild into a balanced tree if repeated splicing has degraded it
    fn rebalanced(self) -> ParaList {
        let height = self.root.height();
        let optimal = usize::BITS as usize - self.len().max(1).leading_zeros() as usize + 1;

        if height <= optimal * 2 {
            return self;
        }

        let mut leaves = Vec::with_capacity(self.len());
        self.root.collect_leaves(&mut leaves);
        ParaList {
            root: Self::build_tree(leaves),
        }
    }
}

impl ListNode {
    fn branch(left: Arc<ListNode>, right: Arc<ListNode>) -> Arc<ListNode> {
        let left_count = left.count();
        let count = left_count + right.count();
        let height = left.height().max(right.height()) + 1;
        Arc::new(ListNode::Branch {
            left,
            right,
            left_count,
            count,
            height,
        })
    }

    /// Merge two nodes, dropping empty sides
    fn merge(left: Arc<ListNode>, right: Arc<ListNode>) -> Arc<ListNode> {
        match (&*left, &*right) {
            (ListNode::Empty, _) => right,
            (_, ListNode::Empty) => left,
            _ => Self::branch(left, right),
        }
    }

    fn count(&self) -> usize {
        match self {
            ListNode::Empty => 0,
            ListNode::Leaf(_) => 1,
            ListNode::Branch { count, .. } => *count,
        }
    }

    fn height(&self) -> usize {
        match self {
            ListNode::Empty | ListNode::Leaf(_) => 1,
            ListNode::Branch { height, .. } => *height,
        }
    }

    fn get(&self, index: usize) -> &ParaRef {
        match self {
            ListNode::Empty => unreachable!("index past the end of the paragraph list"),
            ListNode::Leaf(para) => para,
            ListNode::Branch {
                left,
                right,
                left_count,
                ..
            } => {
                if index < *left_count {
                    left.get(index)
                } else {
                    right.get(index - left_count)
                }
            }
        }
    }

    fn collect_leaves(&self, leaves: &mut Vec<Arc<ListNode>>) {
        match self {
            ListNode::Empty => {}
            ListNode::Leaf(para) => leaves.push(Arc::new(ListNode::Leaf(para.clone()))),
            ListNode::Branch { left, right, .. } => {
                left.collect_leaves(leaves);
                right.collect_leaves(leaves);
            }
        }
    }
}

/// In-order iterator over paragraph handles
pub struct ParaIter<'a> {
    /// Nodes whose leaves are still pending, rightmost deepest
    stack: Vec<&'a ListNode>,
    remaining: usize,
}

impl<'a> ParaIter<'a> {
    /// Seed the stack so the next leaf yielded is the one at `index`
    fn descend(&mut self, node: &'a ListNode, index: usize) {
        match node {
            ListNode::Empty => {}
            ListNode::Leaf(_) => {
                if index == 0 {
                    self.stack.push(node);
                }
            }
            ListNode::Branch {
                left,
                right,
                left_count,
                ..
            } => {
                if index < *left_count {
                    self.stack.push(right);
                    self.descend(left, index);
                } else {
                    self.descend(right, index - left_count);
                }
            }
        }
    }
}

impl<'a> Iterator for ParaIter<'a> {
    type Item = &'a ParaRef;

    fn next(&mut self) -> Option<&'a ParaRef> {
        if self.remaining == 0 {
            return None;
        }

        while let Some(node) = self.stack.pop() {
            match node {
                ListNode::Empty => {}
                ListNode::Leaf(para) => {
                    self.remaining -= 1;
                    return Some(para);
                }
                ListNode::Branch { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }

        None
    }
}
