//! End-to-end behaviour of the chain model on small concrete inputs.

#[cfg(test)]
mod tests {
    use cb_chain_model::{
        new_work_diff, Block, ChainModelConfig, Header, InterLink, ModelError, Signer,
        Transaction, VoteMsg, VoteMsgType,
    };
    use shared_crypto::CryptoError;
    use shared_types::{BlockNonce, Difficulty, Hash, U256};

    use crate::fixtures::{alice, header, signed_transfer, transfer};

    const NANOS: u64 = 1_000_000_000;

    #[test]
    fn test_fees_sum_gas_price_times_limit() {
        let txs: Vec<Transaction> = (0..10).map(|n| transfer(n, 1, 21_000)).collect();
        let block = Block::new(&header(5), txs, vec![]);
        assert_eq!(block.get_transaction_fees(), Ok(U256::from(210_000)));

        let single = Block::new(&header(6), vec![transfer(0, 1, 42_000)], vec![]);
        assert_eq!(single.get_transaction_fees(), Ok(U256::from(42_000)));

        let empty = Block::new(&header(7), vec![], vec![]);
        assert_eq!(empty.get_transaction_fees(), Ok(U256::zero()));
        assert_eq!(empty.tx_root(), cb_state_trie::EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_signature_is_bound_to_its_chain() {
        let tx = signed_transfer(&alice(), 1, 0);
        assert_eq!(tx.sender(Some(&Signer::new(1u64))).unwrap(), alice().address());
        assert_eq!(tx.sender(None).unwrap(), alice().address());

        assert_eq!(
            tx.sender(Some(&Signer::new(100u64))),
            Err(ModelError::Crypto(CryptoError::InvalidSignature))
        );
    }

    #[test]
    fn test_nonce_only_changes_full_hash() {
        let a = header(9);
        let mut b = a.clone();
        b.nonce = BlockNonce::from_u64(8);

        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash_without_nonce(), b.hash_without_nonce());
    }

    #[test]
    fn test_retarget_on_schedule_keeps_target() {
        let config = ChainModelConfig::default();
        let expected = config.block_count_of_period * config.block_generate;
        let diff = Difficulty::from_compact(0x1e00_ffff);

        let pre = Header {
            timestamp: U256::from(1_000u64) * U256::from(NANOS),
            diff,
            ..header(0)
        };
        let last = Header {
            timestamp: U256::from(1_000 + expected) * U256::from(NANOS),
            diff,
            ..header(config.block_count_of_period - 2)
        };

        let next = new_work_diff(&config, &pre, &last, config.block_count_of_period - 1);
        assert_eq!(next.target(), diff.target());
    }

    #[test]
    fn test_interlink_at_height_one() {
        let parent = Hash([0x5a; 32]);
        let h = Header {
            pre_hash: parent,
            ..header(1)
        };
        assert_eq!(InterLink::next(&InterLink::default(), &h).0, vec![parent, parent]);

        let block = Block::new_with_link(&h, vec![], vec![], &InterLink::default());
        assert_eq!(block.interlinks().0, vec![parent, parent]);
        assert_eq!(block.interlink_root(), block.interlinks().root());
    }

    #[test]
    fn test_prevote_rejected_while_halted() {
        let vote = VoteMsg::signed_by(3, 0, Hash([1; 32]), VoteMsgType::PreVote, &alice()).unwrap();
        assert_eq!(
            vote.halted_vote_valid(&[alice().address()], &[]),
            Err(ModelError::WrongVoteType)
        );

        let alive = VoteMsg::signed_by(3, 0, Hash([1; 32]), VoteMsgType::AliveVerifierVote, &alice()).unwrap();
        assert_eq!(alive.halted_vote_valid(&[alice().address()], &[]), Ok(()));
        assert_eq!(
            alive.halted_vote_valid(&[], &[alice().address()]),
            Err(ModelError::AddressIsNotCurrentVerifier)
        );
    }
}
