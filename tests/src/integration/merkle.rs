//! Merkle branches over real transaction IDs.

#[cfg(test)]
mod tests {
    use cb_chain_model::{compute_merkle_root, compute_root_from_branch, merkle_computation, MAX_ROUTE_NUMBER};
    use shared_crypto::keccak256;
    use shared_types::Hash;

    use crate::fixtures::{alice, signed_batch};

    fn indexed_leaves(n: u8) -> Vec<Hash> {
        (0..n)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[0] = i;
                keccak256(&bytes)
            })
            .collect()
    }

    #[test]
    fn test_nineteen_indexed_leaves() {
        let leaves = indexed_leaves(19);
        let mut mutated = false;
        let (root, branch) = merkle_computation(&leaves, 9, Some(&mut mutated));

        assert!(!mutated);
        assert_eq!(branch.len(), 5);
        assert_eq!(compute_root_from_branch(leaves[9], &branch, 9), root);
    }

    #[test]
    fn test_every_tx_id_proves_into_root() {
        let ids: Vec<Hash> = signed_batch(&alice(), 1, 13)
            .iter()
            .map(|tx| tx.cal_tx_id())
            .collect();
        let mut mutated = false;
        let root = compute_merkle_root(&ids, &mut mutated);
        assert!(!mutated);

        for (pos, id) in ids.iter().enumerate() {
            let mut flag = false;
            let (r, branch) = merkle_computation(&ids, pos as u32, Some(&mut flag));
            assert_eq!(r, root);
            assert_eq!(compute_root_from_branch(*id, &branch, pos as u32), root);
        }
    }

    #[test]
    fn test_duplicated_tail_is_flagged() {
        let mut leaves = indexed_leaves(6);
        let mut mutated = false;
        let root = compute_merkle_root(&leaves, &mut mutated);
        assert!(!mutated);

        leaves.extend_from_slice(&[leaves[4], leaves[5]]);
        let mut flagged = false;
        assert_eq!(compute_merkle_root(&leaves, &mut flagged), root);
        assert!(flagged);
    }

    #[test]
    fn test_out_of_range_input() {
        let leaves = indexed_leaves(33);
        assert!(leaves.len() > MAX_ROUTE_NUMBER);
        let mut mutated = false;
        assert_eq!(merkle_computation(&leaves, 0, Some(&mut mutated)), (Hash::ZERO, vec![]));
        assert_eq!(merkle_computation(&leaves[..4], 4, Some(&mut mutated)), (Hash::ZERO, vec![]));
    }
}
