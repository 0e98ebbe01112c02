//! # Merkle branches over transaction hashes
//!
//! Bitcoin-style tree: a level with an odd number of nodes duplicates its
//! last node. That makes `[1,2,3,4,5,6]` and `[1,2,3,4,5,6,5,6]` share a
//! root (CVE-2012-2459). The construction is kept for compatibility; the
//! `mutated` flag reports when two identical hashes were paired while
//! folding the leaves, and a caller must treat that list as invalid.

use shared_crypto::keccak256_many;
use shared_types::Hash;

/// Largest leaf count accepted.
pub const MAX_ROUTE_NUMBER: usize = 32;

fn pair(left: &Hash, right: &Hash) -> Hash {
    keccak256_many(&[left.as_bytes(), right.as_bytes()])
}

/// Root of `leaves` and the sibling path of the leaf at `pos`.
///
/// Returns the zero hash and an empty path, leaving `mutated` untouched, when
/// `mutated` is `None`, `leaves` is empty or longer than
/// [`MAX_ROUTE_NUMBER`], or `pos` is out of range.
pub fn merkle_computation(leaves: &[Hash], pos: u32, mutated: Option<&mut bool>) -> (Hash, Vec<Hash>) {
    let Some(mutated_out) = mutated else {
        return (Hash::ZERO, Vec::new());
    };
    if leaves.is_empty() || leaves.len() > MAX_ROUTE_NUMBER || pos as usize >= leaves.len() {
        return (Hash::ZERO, Vec::new());
    }

    // inner[level] holds the pending left subtree root of each height
    let mut inner = [Hash::ZERO; MAX_ROUTE_NUMBER];
    let mut branch = Vec::new();
    let mut mutated = false;
    let mut match_level: Option<usize> = None;
    let mut count: u32 = 0;

    while (count as usize) < leaves.len() {
        let mut h = leaves[count as usize];
        let mut matched = count == pos;
        count += 1;

        let mut level = 0usize;
        while count & (1u32 << level) == 0 {
            if matched {
                branch.push(inner[level]);
            } else if match_level == Some(level) {
                branch.push(h);
                matched = true;
            }
            if inner[level] == h {
                mutated = true;
            }
            h = pair(&inner[level], &h);
            level += 1;
        }
        inner[level] = h;
        if matched {
            match_level = Some(level);
        }
    }

    // Fold what is left, duplicating lone nodes up to the next power of two
    let mut level = 0usize;
    while count & (1u32 << level) == 0 {
        level += 1;
    }
    let mut h = inner[level];
    let mut matched = match_level == Some(level);

    while count != 1u32 << level {
        if matched {
            branch.push(h);
        }
        h = pair(&h, &h);
        count += 1u32 << level;
        level += 1;

        while count & (1u32 << level) == 0 {
            if matched {
                branch.push(inner[level]);
            } else if match_level == Some(level) {
                branch.push(h);
                matched = true;
            }
            h = pair(&inner[level], &h);
            level += 1;
        }
    }

    *mutated_out = mutated;
    (h, branch)
}

/// Root of `leaves`; see [`merkle_computation`].
pub fn compute_merkle_root(leaves: &[Hash], mutated: &mut bool) -> Hash {
    merkle_computation(leaves, 0, Some(mutated)).0
}

/// Rebuild the root from a leaf, its index and its sibling path.
pub fn compute_root_from_branch(leaf: Hash, branch: &[Hash], mut index: u32) -> Hash {
    let mut h = leaf;
    for sibling in branch {
        h = if index & 1 == 1 {
            pair(sibling, &h)
        } else {
            pair(&h, sibling)
        };
        index >>= 1;
    }
    h
}
