//! Digit-indexed trie for longest-prefix AI lookup.
//!
//! AI codes are 2-4 ASCII digits, so the trie is a flat vector of nodes with
//! an array-of-children indexed by digit. Lookup walks at most four levels,
//! giving the O(k) bound independent of dictionary size.

/// Maximum AI code length per the GS1 General Specifications.
pub(crate) const MAX_AI_LEN: usize = 4;

#[derive(Debug, Clone)]
struct Node {
    /// Child node index per digit; `u32::MAX` marks no child.
    children: [u32; 10],
    /// Index of the spec terminating at this node, if any.
    terminal: Option<u32>,
}

impl Node {
    fn new() -> Self {
        Node {
            children: [u32::MAX; 10],
            terminal: None,
        }
    }
}

/// Flat digit trie mapping AI codes to spec indices.
#[derive(Debug, Clone)]
pub(crate) struct DigitTrie {
    nodes: Vec<Node>,
}

impl DigitTrie {
    pub(crate) fn new() -> Self {
        DigitTrie {
            nodes: vec![Node::new()],
        }
    }

    /// Insert `code` pointing at `spec_index`. Returns false if the code was
    /// already present or contains a non-digit.
    pub(crate) fn insert(&mut self, code: &str, spec_index: u32) -> bool {
        let mut node = 0usize;
        for byte in code.bytes() {
            if !byte.is_ascii_digit() {
                return false;
            }
            let digit = (byte - b'0') as usize;
            let next = self.nodes[node].children[digit];
            node = if next == u32::MAX {
                let idx = self.nodes.len() as u32;
                self.nodes[node].children[digit] = idx;
                self.nodes.push(Node::new());
                idx as usize
            } else {
                next as usize
            };
        }
        if self.nodes[node].terminal.is_some() {
            return false;
        }
        self.nodes[node].terminal = Some(spec_index);
        true
    }

    /// Longest code that is a prefix of `input` at `start`.
    ///
    /// Walks the trie as far as the input allows; the deepest terminal
    /// visited wins.
    pub(crate) fn longest_match(&self, input: &[u8], start: usize) -> Option<(u32, usize)> {
        if start >= input.len() {
            return None;
        }
        let mut node = 0usize;
        let mut best = None;
        let end = input.len().min(start + MAX_AI_LEN);
        for (depth, &byte) in input[start..end].iter().enumerate() {
            if !byte.is_ascii_digit() {
                break;
            }
            let next = self.nodes[node].children[(byte - b'0') as usize];
            if next == u32::MAX {
                break;
            }
            node = next as usize;
            if let Some(spec) = self.nodes[node].terminal {
                best = Some((spec, depth + 1));
            }
        }
        best
    }

    /// Every code that is a prefix of `input` at `start`, longest first.
    ///
    /// The reconstructor uses this to admit ambiguity between, say, a
    /// 4-digit and a 2-digit code at the same offset.
    pub(crate) fn prefix_matches(&self, input: &[u8], start: usize) -> Vec<(u32, usize)> {
        if start >= input.len() {
            return Vec::new();
        }
        let mut node = 0usize;
        let mut matches = Vec::new();
        let end = input.len().min(start + MAX_AI_LEN);
        for (depth, &byte) in input[start..end].iter().enumerate() {
            if !byte.is_ascii_digit() {
                break;
            }
            let next = self.nodes[node].children[(byte - b'0') as usize];
            if next == u32::MAX {
                break;
            }
            node = next as usize;
            if let Some(spec) = self.nodes[node].terminal {
                matches.push((spec, depth + 1));
            }
        }
        matches.reverse();
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DigitTrie {
        let mut t = DigitTrie::new();
        assert!(t.insert("01", 0));
        assert!(t.insert("10", 1));
        assert!(t.insert("37", 2));
        assert!(t.insert("3102", 3));
        assert!(t.insert("421", 4));
        t
    }

    #[test]
    fn test_longest_match_prefers_deepest_terminal() {
        let t = sample();
        assert_eq!(t.longest_match(b"3102xx", 0), Some((3, 4)));
        // 371234: 37 is a code, 371 is not
        assert_eq!(t.longest_match(b"371234", 0), Some((2, 2)));
    }

    #[test]
    fn test_no_match() {
        let t = sample();
        assert_eq!(t.longest_match(b"99", 0), None);
        assert_eq!(t.longest_match(b"AB", 0), None);
        assert_eq!(t.longest_match(b"", 0), None);
    }

    #[test]
    fn test_offset_lookup() {
        let t = sample();
        assert_eq!(t.longest_match(b"xx01", 2), Some((0, 2)));
    }

    #[test]
    fn test_prefix_matches_longest_first() {
        let mut t = sample();
        assert!(t.insert("3", 5));
        let m = t.prefix_matches(b"3102", 0);
        assert_eq!(m, vec![(3, 4), (5, 1)]);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut t = sample();
        assert!(!t.insert("01", 9));
        assert!(!t.insert("1x", 9));
    }
}
