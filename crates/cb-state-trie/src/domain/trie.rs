use super::{nibbles::Nibbles, node::TrieNode, Hash};

/// In-memory Merkle-Patricia trie.
///
/// Built once per root computation; there is no persistence and no deletion.
#[derive(Debug, Default, Clone)]
pub struct PatriciaTrie {
    root: TrieNode,
    len: usize,
}

impl PatriciaTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts or overwrites the value stored under `key`.
    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) {
        let path = Nibbles::from_bytes(key);
        let root = std::mem::take(&mut self.root);
        let (root, added) = insert_at(root, path.as_slice(), value);
        self.root = root;
        if added {
            self.len += 1;
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let key_path = Nibbles::from_bytes(key);
        let mut node = &self.root;
        let mut rest = key_path.as_slice();
        loop {
            match node {
                TrieNode::Empty => return None,
                TrieNode::Leaf { path, value } => {
                    return (path.as_slice() == rest).then_some(value.as_slice());
                }
                TrieNode::Extension { path, child } => {
                    rest = rest.strip_prefix(path.as_slice())?;
                    node = child.as_ref();
                }
                TrieNode::Branch { children, value } => match rest.split_first() {
                    None => return value.as_deref(),
                    Some((&nibble, tail)) => {
                        node = &children[nibble as usize];
                        rest = tail;
                    }
                },
            }
        }
    }

    pub fn root_node(&self) -> &TrieNode {
        &self.root
    }

    /// Keccak-256 root; [`super::EMPTY_TRIE_ROOT`] when nothing was inserted.
    pub fn root_hash(&self) -> Hash {
        self.root.hash()
    }
}

/// Puts `value` under `path` below `node`. Returns the new subtree and
/// whether a new key was created.
fn insert_at(node: TrieNode, path: &[u8], value: Vec<u8>) -> (TrieNode, bool) {
    match node {
        TrieNode::Empty => (
            TrieNode::Leaf {
                path: path.into(),
                value,
            },
            true,
        ),

        TrieNode::Leaf {
            path: leaf_path,
            value: leaf_value,
        } => {
            let common = leaf_path.common_prefix_len(path);
            if common == leaf_path.len() && common == path.len() {
                return (
                    TrieNode::Leaf {
                        path: leaf_path,
                        value,
                    },
                    false,
                );
            }

            let mut branch = TrieNode::empty_branch();
            place(&mut branch, &leaf_path.as_slice()[common..], leaf_value);
            place(&mut branch, &path[common..], value);
            (wrap_extension(&path[..common], branch), true)
        }

        TrieNode::Extension {
            path: ext_path,
            child,
        } => {
            let common = ext_path.common_prefix_len(path);
            if common == ext_path.len() {
                let (child, added) = insert_at(*child, &path[common..], value);
                return (
                    TrieNode::Extension {
                        path: ext_path,
                        child: Box::new(child),
                    },
                    added,
                );
            }

            // The extension splits at `common`: its remainder hangs off a new branch.
            let mut branch = TrieNode::empty_branch();
            if let TrieNode::Branch { children, .. } = &mut branch {
                let slot = ext_path.as_slice()[common] as usize;
                let tail = &ext_path.as_slice()[common + 1..];
                children[slot] = if tail.is_empty() {
                    *child
                } else {
                    TrieNode::Extension {
                        path: tail.into(),
                        child,
                    }
                };
            }
            place(&mut branch, &path[common..], value);
            (wrap_extension(&path[..common], branch), true)
        }

        TrieNode::Branch {
            mut children,
            value: branch_value,
        } => match path.split_first() {
            None => {
                let added = branch_value.is_none();
                (
                    TrieNode::Branch {
                        children,
                        value: Some(value),
                    },
                    added,
                )
            }
            Some((&nibble, tail)) => {
                let slot = nibble as usize;
                let (child, added) = insert_at(std::mem::take(&mut children[slot]), tail, value);
                children[slot] = child;
                (
                    TrieNode::Branch {
                        children,
                        value: branch_value,
                    },
                    added,
                )
            }
        },
    }
}

/// Stores `value` in a fresh branch: on the branch itself for an empty path,
/// otherwise as a leaf under the first nibble.
fn place(branch: &mut TrieNode, path: &[u8], value: Vec<u8>) {
    if let TrieNode::Branch {
        children,
        value: slot_value,
    } = branch
    {
        match path.split_first() {
            None => *slot_value = Some(value),
            Some((&nibble, tail)) => {
                children[nibble as usize] = TrieNode::Leaf {
                    path: tail.into(),
                    value,
                };
            }
        }
    }
}

fn wrap_extension(prefix: &[u8], branch: TrieNode) -> TrieNode {
    if prefix.is_empty() {
        branch
    } else {
        TrieNode::Extension {
            path: prefix.into(),
            child: Box::new(branch),
        }
    }
}
