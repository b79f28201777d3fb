//! Rope data structure for immutable text storage
//!
//! Every operation returns a new rope; unchanged subtrees are shared, so
//! `insert`, `split` and `concat` are O(log n) in time and allocation.

use std::fmt;
use std::sync::Arc;

/// Maximum size of a leaf node in bytes
const MAX_LEAF_SIZE: usize = 1024;

/// Persistent rope over UTF-8 text
#[derive(Clone)]
pub struct Rope {
    root: Arc<RopeNode>,
}

enum RopeNode {
    /// Internal node with two children
    Branch {
        left: Arc<RopeNode>,
        right: Arc<RopeNode>,
        /// Total bytes in left subtree
        left_weight: usize,
        /// Total bytes in this subtree
        len: usize,
        height: usize,
    },
    /// Leaf node containing actual text
    Leaf { text: Arc<str> },
    /// Empty node
    Empty,
}

impl Default for Rope {
    fn default() -> Self {
        Self::new()
    }
}

impl Rope {
    /// Create a new empty rope
    pub fn new() -> Self {
        Self {
            root: Arc::new(RopeNode::Empty),
        }
    }

    /// Create a rope from a string
    pub fn from_str(s: &str) -> Self {
        if s.is_empty() {
            return Self::new();
        }

        let mut leaves = Vec::with_capacity(s.len() / MAX_LEAF_SIZE + 1);
        let mut rest = s;
        while !rest.is_empty() {
            let mut at = rest.len().min(MAX_LEAF_SIZE);
            // Leaf boundaries must not split a code point.
            while !rest.is_char_boundary(at) {
                at -= 1;
            }
            let (chunk, tail) = rest.split_at(at);
            leaves.push(Arc::new(RopeNode::Leaf { text: chunk.into() }));
            rest = tail;
        }

        Self {
            root: Self::build_tree(leaves),
        }
    }

    /// Build a balanced tree from leaf nodes
    fn build_tree(mut nodes: Vec<Arc<RopeNode>>) -> Arc<RopeNode> {
        if nodes.is_empty() {
            return Arc::new(RopeNode::Empty);
        }

        while nodes.len() > 1 {
            let mut new_nodes = Vec::with_capacity(nodes.len().div_ceil(2));

            for pair in nodes.chunks(2) {
                if pair.len() == 2 {
                    new_nodes.push(RopeNode::branch(pair[0].clone(), pair[1].clone()));
                } else {
                    new_nodes.push(pair[0].clone());
                }
            }

            nodes = new_nodes;
        }

        nodes.remove(0)
    }

    /// Get total length in bytes
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Check if rope is empty
    pub fn is_empty(&self) -> bool {
        self.root.len() == 0
    }

    /// Insert text at the given byte offset, returning the new rope
    pub fn insert(&self, at: usize, text: &str) -> Rope {
        assert!(
            at <= self.len(),
            "rope insert offset {at} out of range 0..={}",
            self.len()
        );
        if text.is_empty() {
            return self.clone();
        }

        let (left, right) = self.split(at);
        left.concat(&Rope::from_str(text)).concat(&right)
    }

    /// Split the rope at the given byte offset
    ///
    /// Returns the pair of ropes whose concatenation equals the original.
    /// The offset must lie on a code-point boundary.
    pub fn split(&self, at: usize) -> (Rope, Rope) {
        assert!(
            at <= self.len(),
            "rope split offset {at} out of range 0..={}",
            self.len()
        );
        assert!(
            self.is_char_boundary(at),
            "rope split offset {at} is not a code-point boundary"
        );

        let (left, right) = Self::split_node(&self.root, at);
        (
            Rope { root: left }.rebalanced(),
            Rope { root: right }.rebalanced(),
        )
    }

    fn split_node(node: &Arc<RopeNode>, at: usize) -> (Arc<RopeNode>, Arc<RopeNode>) {
        match &**node {
            RopeNode::Empty => (Arc::new(RopeNode::Empty), Arc::new(RopeNode::Empty)),
            RopeNode::Leaf { text } => {
                if at == 0 {
                    (Arc::new(RopeNode::Empty), node.clone())
                } else if at >= text.len() {
                    (node.clone(), Arc::new(RopeNode::Empty))
                } else {
                    let (lt, rt) = text.split_at(at);
                    (
                        Arc::new(RopeNode::Leaf { text: lt.into() }),
                        Arc::new(RopeNode::Leaf { text: rt.into() }),
                    )
                }
            }
            RopeNode::Branch {
                left,
                right,
                left_weight,
                ..
            } => {
                if at <= *left_weight {
                    let (ll, lr) = Self::split_node(left, at);
                    (ll, RopeNode::merge(lr, right.clone()))
                } else {
                    let (rl, rr) = Self::split_node(right, at - left_weight);
                    (RopeNode::merge(left.clone(), rl), rr)
                }
            }
        }
    }

    /// Concatenate two ropes
    pub fn concat(&self, other: &Rope) -> Rope {
        Rope {
            root: RopeNode::merge(self.root.clone(), other.root.clone()),
        }
        .rebalanced()
    }

    /// Get a slice of text
    pub fn slice(&self, start: usize, end: usize) -> String {
        let mut result = String::with_capacity(end.saturating_sub(start));
        self.root.collect_range(start, end, &mut result);
        result
    }

    /// Check whether the offset falls on a code-point boundary
    pub fn is_char_boundary(&self, at: usize) -> bool {
        if at > self.len() {
            return false;
        }
        self.root.is_char_boundary(at)
    }

    /// Read the code point starting at the given byte offset
    pub fn char_at(&self, at: usize) -> Option<char> {
        if at >= self.len() {
            return None;
        }
        self.root.char_at(at)
    }

    /// Rebuild into a balanced tree if repeated splicing has degraded it
    fn rebalanced(self) -> Rope {
        let height = self.root.height();
        let optimal = (self.len().max(1) as f64 / MAX_LEAF_SIZE as f64)
            .log2()
            .ceil()
            .max(0.0) as usize
            + 1;

        if height <= optimal * 2 {
            return self;
        }

        let mut leaves = Vec::new();
        self.root.collect_leaves(&mut leaves);
        Rope {
            root: Self::build_tree(leaves),
        }
    }
}

impl RopeNode {
    fn branch(left: Arc<RopeNode>, right: Arc<RopeNode>) -> Arc<RopeNode> {
        let left_weight = left.len();
        let len = left_weight + right.len();
        let height = left.height().max(right.height()) + 1;
        Arc::new(RopeNode::Branch {
            left,
            right,
            left_weight,
            len,
            height,
        })
    }

    /// Merge two nodes, dropping empty sides and fusing small leaves
    fn merge(left: Arc<RopeNode>, right: Arc<RopeNode>) -> Arc<RopeNode> {
        match (&*left, &*right) {
            (RopeNode::Empty, _) => right,
            (_, RopeNode::Empty) => left,
            (RopeNode::Leaf { text: lt }, RopeNode::Leaf { text: rt })
                if lt.len() + rt.len() <= MAX_LEAF_SIZE =>
            {
                let mut text = String::with_capacity(lt.len() + rt.len());
                text.push_str(lt);
                text.push_str(rt);
                Arc::new(RopeNode::Leaf { text: text.into() })
            }
            _ => Self::branch(left, right),
        }
    }

    fn len(&self) -> usize {
        match self {
            RopeNode::Empty => 0,
            RopeNode::Leaf { text } => text.len(),
            RopeNode::Branch { len, .. } => *len,
        }
    }

    fn height(&self) -> usize {
        match self {
            RopeNode::Empty | RopeNode::Leaf { .. } => 1,
            RopeNode::Branch { height, .. } => *height,
        }
    }

    fn is_char_boundary(&self, at: usize) -> bool {
        match self {
            RopeNode::Empty => at == 0,
            RopeNode::Leaf { text } => text.is_char_boundary(at.min(text.len())),
            RopeNode::Branch {
                left,
                right,
                left_weight,
                ..
            } => {
                if at <= *left_weight {
                    left.is_char_boundary(at)
                } else {
                    right.is_char_boundary(at - left_weight)
                }
            }
        }
    }

    fn char_at(&self, at: usize) -> Option<char> {
        match self {
            RopeNode::Empty => None,
            RopeNode::Leaf { text } => text[at..].chars().next(),
            RopeNode::Branch {
                left,
                right,
                left_weight,
                ..
            } => {
                if at < *left_weight {
                    left.char_at(at)
                } else {
                    right.char_at(at - left_weight)
                }
            }
        }
    }

    fn collect_leaves(&self, leaves: &mut Vec<Arc<RopeNode>>) {
        match self {
            RopeNode::Empty => {}
            RopeNode::Leaf { text } => leaves.push(Arc::new(RopeNode::Leaf { text: text.clone() })),
            RopeNode::Branch { left, right, .. } => {
                left.collect_leaves(leaves);
                right.collect_leaves(leaves);
            }
        }
    }

    fn collect_range(&self, start: usize, end: usize, result: &mut String) {
        if start >= end {
            return;
        }

        match self {
            RopeNode::Empty => {}
            RopeNode::Leaf { text } => {
                let s = start.min(text.len());
                let e = end.min(text.len());
                if s < e {
                    result.push_str(&text[s..e]);
                }
            }
            RopeNode::Branch {
                left,
                right,
                left_weight,
                ..
            } => {
                if start < *left_weight {
                    left.collect_range(start, end.min(*left_weight), result);
                }
                if end > *left_weight {
                    right.collect_range(
                        start.saturating_sub(*left_weight),
                        end - *left_weight,
                        result,
                    );
                }
            }
        }
    }

    fn collect_all(&self, result: &mut String) {
        match self {
            RopeNode::Empty => {}
            RopeNode::Leaf { text } => result.push_str(text),
            RopeNode::Branch { left, right, .. } => {
                left.collect_all(result);
                right.collect_all(result);
            }
        }
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = String::with_capacity(self.len());
        self.root.collect_all(&mut result);
        write!(f, "{}", result)
    }
}

impl fmt::Debug for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rope({:?})", self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rope() {
        let rope = Rope::new();
        assert_eq!(rope.len(), 0);
        assert!(rope.is_empty());
    }

    #[test]
    fn test_from_str() {
        let rope = Rope::from_str("Hello, World!");
        assert_eq!(rope.len(), 13);
        assert_eq!(rope.to_string(), "Hello, World!");
    }

    #[test]
    fn test_insert() {
        let rope = Rope::from_str("Hello World");
        let inserted = rope.insert(5, ",");
        assert_eq!(inserted.to_string(), "Hello, World");
        // the source rope is untouched
        assert_eq!(rope.to_string(), "Hello World");
    }

    #[test]
    fn test_insert_at_ends() {
        let rope = Rope::from_str("bc");
        assert_eq!(rope.insert(0, "a").to_string(), "abc");
        assert_eq!(rope.insert(2, "d").to_string(), "bcd");
    }

    #[test]
    fn test_split() {
        let rope = Rope::from_str("Hello, World!");
        let (left, right) = rope.split(5);
        assert_eq!(left.to_string(), "Hello");
        assert_eq!(right.to_string(), ", World!");
        assert_eq!(left.len() + right.len(), rope.len());
    }

    #[test]
    fn test_split_at_ends() {
        let rope = Rope::from_str("abc");
        let (left, right) = rope.split(0);
        assert_eq!(left.to_string(), "");
        assert_eq!(right.to_string(), "abc");
        let (left, right) = rope.split(3);
        assert_eq!(left.to_string(), "abc");
        assert_eq!(right.to_string(), "");
    }

    #[test]
    #[should_panic(expected = "code-point boundary")]
    fn test_split_inside_code_point() {
        let rope = Rope::from_str("é");
        rope.split(1);
    }

    #[test]
    fn test_slice() {
        let rope = Rope::from_str("Hello, World!");
        assert_eq!(rope.slice(0, 5), "Hello");
        assert_eq!(rope.slice(7, 12), "World");
    }

    #[test]
    fn test_char_at() {
        let rope = Rope::from_str("aé語");
        assert_eq!(rope.char_at(0), Some('a'));
        assert_eq!(rope.char_at(1), Some('é'));
        assert_eq!(rope.char_at(3), Some('語'));
        assert_eq!(rope.char_at(6), None);
    }

    #[test]
    fn test_char_boundary() {
        let rope = Rope::from_str("aé");
        assert!(rope.is_char_boundary(0));
        assert!(rope.is_char_boundary(1));
        assert!(!rope.is_char_boundary(2));
        assert!(rope.is_char_boundary(3));
        assert!(!rope.is_char_boundary(4));
    }

    #[test]
    fn test_large_insert() {
        let large_text = "x".repeat(10_000);
        let rope = Rope::new().insert(0, &large_text);
        assert_eq!(rope.len(), 10_000);
    }

    #[test]
    fn test_multi_leaf_boundaries() {
        // wide enough to span several leaves, made of multi-byte chars
        let text = "é".repeat(3 * MAX_LEAF_SIZE);
        let rope = Rope::from_str(&text);
        assert_eq!(rope.len(), text.len());
        assert_eq!(rope.to_string(), text);
        assert_eq!(rope.char_at(MAX_LEAF_SIZE * 2), Some('é'));
    }

    #[test]
    fn test_repeated_inserts_stay_balanced() {
        let mut rope = Rope::new();
        for i in 0..2_000 {
            rope = rope.insert(rope.len(), if i % 2 == 0 { "ab" } else { "c" });
        }
        assert_eq!(rope.len(), 3_000);
        assert_eq!(rope.slice(0, 3), "abc");
    }
}
