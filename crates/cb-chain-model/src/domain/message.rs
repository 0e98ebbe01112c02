use shared_types::{Address, U256};

/// A transaction reduced to what the VM needs to execute it, with the sender
/// already recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: Address,
    /// `None` deploys a contract
    pub to: Option<Address>,
    pub nonce: u64,
    pub amount: U256,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub data: Vec<u8>,
    pub check_nonce: bool,
}

impl Message {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        from: Address,
        to: Option<Address>,
        nonce: u64,
        amount: U256,
        gas_limit: u64,
        gas_price: U256,
        data: Vec<u8>,
        check_nonce: bool,
    ) -> Self {
        Self {
            from,
            to,
            nonce,
            amount,
            gas_limit,
            gas_price,
            data,
            check_nonce,
        }
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}
