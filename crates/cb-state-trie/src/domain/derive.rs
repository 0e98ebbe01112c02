use super::{trie::PatriciaTrie, Hash};

/// An ordered list whose items can be committed into a trie.
pub trait DerivableList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trie key of item `index`.
    fn key(&self, index: usize) -> Vec<u8>;

    /// Trie value of item `index`.
    fn value(&self, index: usize) -> Vec<u8>;
}

/// Root of a fresh trie holding every `(key, value)` pair of `list`.
pub fn derive_sha<L: DerivableList + ?Sized>(list: &L) -> Hash {
    let mut trie = PatriciaTrie::new();
    for index in 0..list.len() {
        trie.insert(&list.key(index), list.value(index));
    }
    trie.root_hash()
}

/// Canonical RLP encoding of a list position, the key used for votes and
/// inter-links.
pub fn index_key(index: usize) -> Vec<u8> {
    rlp::encode(&(index as u64)).to_vec()
}
