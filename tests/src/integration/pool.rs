//! A pending batch flowing through admission, fee ordering, ID caching and
//! the block bloom.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use cb_chain_model::{
        start_tx_cacher, stop_tx_cacher, tx_difference, tx_recover, Block, ChainStateReader,
        ModelError, Result, Signer, StateTxValidator, Transaction, TransactionsByFeeAndNonce,
        TxValidator,
    };
    use shared_types::{Address, U256};

    use crate::fixtures::{alice, bob, header, normal_address};

    #[derive(Default)]
    struct State {
        accounts: HashMap<Address, (u64, U256)>,
    }

    impl ChainStateReader for State {
        fn current_block_number(&self) -> u64 {
            100
        }

        fn account_nonce(&self, address: &Address) -> Result<u64> {
            Ok(self.accounts.get(address).map_or(0, |a| a.0))
        }

        fn account_balance(&self, address: &Address) -> Result<U256> {
            Ok(self.accounts.get(address).map_or_else(U256::zero, |a| a.1))
        }
    }

    fn priced(key: &shared_crypto::Secp256k1KeyPair, nonce: u64, price: u64) -> Arc<Transaction> {
        let tx = Transaction::new(nonce, normal_address(0x42), U256::one(), U256::from(price), 21_000, vec![])
            .sign(key, &Signer::new(7u64))
            .unwrap();
        Arc::new(tx)
    }

    #[test]
    fn test_admission_against_state() {
        let mut state = State::default();
        state.accounts.insert(alice().address(), (2, U256::from(1_000_000)));
        let validator = StateTxValidator::new(state, Signer::new(7u64));

        assert_eq!(validator.valid(&priced(&alice(), 2, 10)), Ok(()));
        assert!(matches!(
            validator.valid(&priced(&alice(), 1, 10)),
            Err(ModelError::NonceTooLow { .. })
        ));
        // bob has no funds
        assert!(matches!(
            validator.valid(&priced(&bob(), 0, 10)),
            Err(ModelError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_fee_order_respects_nonces() {
        let a = vec![priced(&alice(), 0, 5), priced(&alice(), 1, 50)];
        let b = vec![priced(&bob(), 0, 20), priced(&bob(), 1, 1)];
        let mut by_sender = HashMap::new();
        by_sender.insert(alice().address(), a);
        by_sender.insert(bob().address(), b);

        let mut order = TransactionsByFeeAndNonce::new(Signer::new(7u64), by_sender);
        let mut prices = Vec::new();
        while let Some(tx) = order.peek() {
            prices.push(tx.gas_price().low_u64());
            order.shift();
        }
        // alice's 50 waits behind her own 5
        assert_eq!(prices, vec![20, 5, 50, 1]);
    }

    #[test]
    fn test_cached_ids_feed_bloom_and_difference() {
        let batch: Vec<_> = (0..40).map(|n| priced(&alice(), n, 1 + n % 3)).collect();

        start_tx_cacher(4).unwrap();
        tx_recover(&batch).unwrap();
        stop_tx_cacher();

        let included = &batch[..25];
        let block = Block::new(
            &header(3),
            included.iter().map(|tx| Transaction::clone(tx)).collect(),
            vec![],
        );
        let bloom = block.encode_txs_bloom(10).unwrap();
        assert_eq!(bloom, block.get_block_txs_bloom());
        assert_eq!(bloom.config(), cb_bloom_filters::derive_config(25));
        assert!(included.iter().all(|tx| bloom.lookup(tx.cal_tx_id().as_bytes())));

        let left = tx_difference(&batch, block.transactions());
        assert_eq!(left.len(), 15);
        assert_eq!(left[0].nonce(), 25);
    }
}
