use rlp::RlpStream;
use shared_crypto::keccak256;

use super::{nibbles::Nibbles, Hash, EMPTY_TRIE_ROOT};

// =============================================================================
// TRIE NODE: The four node types in MPT
// =============================================================================

/// Node types in the Patricia Merkle Trie.
///
/// Per Ethereum Yellow Paper Appendix D, there are four node types:
/// - Empty (null reference)
/// - Leaf (remaining path + value)
/// - Extension (shared prefix + single child)
/// - Branch (16 children + optional value)
///
/// Children are owned in memory; hashing happens once, bottom-up, when the
/// root is requested.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TrieNode {
    /// Empty node (null reference, hash = EMPTY_TRIE_ROOT).
    #[default]
    Empty,

    /// RLP: [hex_prefix(path, leaf), value]
    Leaf { path: Nibbles, value: Vec<u8> },

    /// RLP: [hex_prefix(path, extension), child_ref]
    Extension { path: Nibbles, child: Box<TrieNode> },

    /// RLP: \[child_ref\[0\], ..., child_ref\[15\], value\]
    Branch {
        children: Box<[TrieNode; 16]>,
        value: Option<Vec<u8>>,
    },
}

impl TrieNode {
    pub(crate) fn empty_branch() -> Self {
        TrieNode::Branch {
            children: Box::default(),
            value: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TrieNode::Empty)
    }

    /// Canonical RLP encoding of this node.
    pub fn rlp_encode(&self) -> Vec<u8> {
        let mut stream = RlpStream::new();
        self.append_to(&mut stream);
        stream.out().to_vec()
    }

    fn append_to(&self, stream: &mut RlpStream) {
        match self {
            TrieNode::Empty => {
                stream.append_empty_data();
            }

            TrieNode::Leaf { path, value } => {
                stream.begin_list(2);
                stream.append(&path.encode_hex_prefix(true));
                stream.append(value);
            }

            TrieNode::Extension { path, child } => {
                stream.begin_list(2);
                stream.append(&path.encode_hex_prefix(false));
                child.append_reference(stream);
            }

            TrieNode::Branch { children, value } => {
                stream.begin_list(17);
                for child in children.iter() {
                    child.append_reference(stream);
                }
                match value {
                    Some(v) => {
                        stream.append(v);
                    }
                    None => {
                        stream.append_empty_data();
                    }
                }
            }
        }
    }

    /// How a parent refers to this node: inline when the encoding is shorter
    /// than a hash, otherwise by its Keccak-256 digest.
    fn append_reference(&self, stream: &mut RlpStream) {
        if self.is_empty() {
            stream.append_empty_data();
            return;
        }
        let encoded = self.rlp_encode();
        if encoded.len() < 32 {
            stream.append_raw(&encoded, 1);
        } else {
            stream.append(&keccak256(&encoded));
        }
    }

    /// Keccak-256 of the node encoding. The root is always hashed, even when
    /// its encoding is short.
    pub fn hash(&self) -> Hash {
        if self.is_empty() {
            return EMPTY_TRIE_ROOT;
        }
        keccak256(&self.rlp_encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_node_hash() {
        assert_eq!(TrieNode::Empty.hash(), EMPTY_TRIE_ROOT);
        assert_eq!(TrieNode::Empty.rlp_encode(), vec![0x80]);
    }

    #[test]
    fn test_leaf_encoding() {
        let leaf = TrieNode::Leaf {
            path: Nibbles(vec![1, 2, 3, 4]),
            value: vec![0xAB, 0xCD],
        };
        // [0x20 0x12 0x34, 0xab 0xcd]
        assert_eq!(
            leaf.rlp_encode(),
            vec![0xc7, 0x83, 0x20, 0x12, 0x34, 0x82, 0xab, 0xcd]
        );
        assert_ne!(leaf.hash(), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_small_child_is_inlined() {
        let leaf = TrieNode::Leaf {
            path: Nibbles(vec![5]),
            value: vec![0x01],
        };
        let ext = TrieNode::Extension {
            path: Nibbles(vec![1, 2]),
            child: Box::new(leaf.clone()),
        };
        let encoded = ext.rlp_encode();
        let inner = leaf.rlp_encode();
        assert!(inner.len() < 32);
        assert!(encoded.windows(inner.len()).any(|w| w == inner.as_slice()));
    }

    #[test]
    fn test_large_child_is_hashed() {
        let leaf = TrieNode::Leaf {
            path: Nibbles(vec![5]),
            value: vec![0x42; 40],
        };
        let ext = TrieNode::Extension {
            path: Nibbles(vec![1, 2]),
            child: Box::new(leaf.clone()),
        };
        let encoded = ext.rlp_encode();
        let digest = leaf.hash();
        assert!(encoded.windows(32).any(|w| w == digest.as_bytes()));
    }
}
