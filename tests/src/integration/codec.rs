//! Canonical encodings survive a round trip with their identities intact.

#[cfg(test)]
mod tests {
    use cb_chain_model::json::{block_from_json, to_json, transaction_from_json};
    use cb_chain_model::{
        Block, BlockDecoder, GenericBodyDecoder, Header, InterLink, Signer, Transaction, Verification,
        VoteMsg, VoteMsgType,
    };
    use proptest::prelude::*;
    use shared_types::{Address, BlockNonce, Hash, U256};

    use crate::fixtures::{alice, bob, header, normal_address, signed_transfer};

    fn sample_block() -> Block {
        let txs = vec![signed_transfer(&alice(), 1, 0), signed_transfer(&bob(), 1, 0)];
        let vote: Verification = VoteMsg::signed_by(4, 1, Hash([9; 32]), VoteMsgType::Vote, &alice())
            .unwrap()
            .into();
        Block::new_with_link(&header(4), txs, vec![vote], &InterLink(vec![Hash([3; 32]); 2]))
    }

    #[test]
    fn test_block_binary_round_trip() {
        let block = sample_block();
        let bytes = rlp::encode(&block);
        let back: Block = rlp::decode(&bytes).unwrap();

        assert_eq!(back, block);
        assert_eq!(back.hash(), block.hash());
        assert_eq!(back.size(), bytes.len());
        for (a, b) in back.transactions().iter().zip(block.transactions()) {
            assert_eq!(a.cal_tx_id(), b.cal_tx_id());
        }
    }

    #[test]
    fn test_block_json_round_trip() -> anyhow::Result<()> {
        let block = sample_block();
        let text = to_json(&block)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["body"]["commit_msg"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["body"]["interlinks"].as_array().map(Vec::len), Some(2));

        let back = block_from_json(&text)?;
        assert_eq!(back.hash(), block.hash());
        assert_eq!(back.interlinks(), block.interlinks());
        assert_eq!(back.verifications(), block.verifications());
        Ok(())
    }

    #[test]
    fn test_generic_decoder_matches_strict_on_votes() -> anyhow::Result<()> {
        let block = sample_block();
        let bytes = rlp::encode(&block);
        let strict = BlockDecoder::default().decode_block(&bytes)?;
        let generic = BlockDecoder::new(Box::new(GenericBodyDecoder)).decode_block(&bytes)?;
        assert_eq!(strict, generic);
        Ok(())
    }

    #[test]
    fn test_header_hash_splices_nonce() {
        for number in [0u64, 1, 4096, 850_893] {
            let h = header(number);
            let mut bytes = h.rlp_without_nonce();
            bytes.extend_from_slice(h.nonce.as_bytes());
            assert_eq!(h.hash(), shared_crypto::keccak256(&bytes));
        }
    }

    #[test]
    fn test_every_other_field_moves_the_hash() {
        let base = header(10);
        let variants = [
            Header { version: 2, ..base.clone() },
            Header { number: 11, ..base.clone() },
            Header { seed: Hash([0xee; 32]), ..base.clone() },
            Header { proof: vec![1], ..base.clone() },
            Header { miner_pub_key: vec![4; 65], ..base.clone() },
            Header { pre_hash: Hash::ZERO, ..base.clone() },
            Header { timestamp: U256::one(), ..base.clone() },
            Header { coinbase: normal_address(0x01), ..base.clone() },
            Header { gas_limit: 1, ..base.clone() },
            Header { gas_used: 1, ..base.clone() },
            Header { state_root: Hash([1; 32]), ..base.clone() },
            Header { receipt_hash: Hash([1; 32]), ..base.clone() },
        ];
        for variant in &variants {
            assert_ne!(variant.hash(), base.hash());
            assert_ne!(variant.hash_without_nonce(), base.hash_without_nonce());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn signed_tx_round_trips(
            nonce in any::<u64>(),
            amount in any::<u64>(),
            price in 1u64..1_000_000,
            data in proptest::collection::vec(any::<u8>(), 0..64),
            chain_id in 1u64..4,
        ) {
            let tx = Transaction::new(nonce, Address::default(), U256::from(amount), U256::from(price), 50_000, data)
                .sign(&alice(), &Signer::new(chain_id))
                .unwrap();
            let id = tx.cal_tx_id();

            let binary: Transaction = rlp::decode(&rlp::encode(&tx)).unwrap();
            prop_assert_eq!(&binary, &tx);
            prop_assert_eq!(binary.cal_tx_id(), id);

            let text = transaction_from_json(&to_json(&tx).unwrap()).unwrap();
            prop_assert_eq!(&text, &tx);
            prop_assert_eq!(text.cal_tx_id(), id);
            prop_assert_eq!(text.sender(None).unwrap(), alice().address());
        }

        #[test]
        fn header_round_trips(number in any::<u64>(), nonce in any::<u64>(), gas_used in any::<u64>()) {
            let h = Header { number, gas_used, nonce: BlockNonce::from_u64(nonce), ..header(0) };
            let back: Header = rlp::decode(&rlp::encode(&h)).unwrap();
            prop_assert_eq!(back.hash(), h.hash());
            prop_assert_eq!(back, h);
        }
    }
}
