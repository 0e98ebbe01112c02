pub mod derive;
pub mod nibbles;
pub mod node;
pub mod trie;

pub use derive::*;
pub use nibbles::Nibbles;
pub use node::TrieNode;
pub use trie::*;

pub use shared_types::Hash;

/// Root of the empty trie, `keccak256(rlp(""))`.
pub const EMPTY_TRIE_ROOT: Hash = Hash([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);
