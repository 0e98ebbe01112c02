//! Typed address derivation.
//!
//! Every derived address is a two-byte type tag followed by the last 20 bytes
//! of a Keccak-256 digest.

use rlp::RlpStream;
use shared_types::{Address, AddressType};

use crate::ecdsa::PublicKeyBytes;
use crate::hashing::keccak256;

fn tagged_tail(kind: AddressType, digest: &[u8; 32]) -> Address {
    let mut body = [0u8; 20];
    body.copy_from_slice(&digest[12..]);
    Address::with_type(kind, &body)
}

/// Normal account of a public key: tag `0x0000` then `keccak(pub[1..])[12..]`.
pub fn normal_address(public_key: &PublicKeyBytes) -> Address {
    tagged_tail(AddressType::Normal, &keccak256(&public_key[1..]).0)
}

/// Shared hash-lock account of two parties, `keccak(rlp([alice, bob]))`.
pub fn lock_address(alice: &Address, bob: &Address) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(alice).append(bob);
    tagged_tail(AddressType::Cross, &keccak256(&stream.out()).0)
}

/// Address of a contract deployed by `caller` at account nonce `nonce`.
pub fn contract_address(caller: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(caller).append(&nonce);
    tagged_tail(AddressType::ContractCall, &keccak256(&stream.out()).0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecdsa::Secp256k1KeyPair;

    #[test]
    fn test_normal_address_tag_and_body() {
        let keypair = Secp256k1KeyPair::from_bytes([0x01u8; 32]).unwrap();
        let pubkey = keypair.public_key();
        let addr = normal_address(&pubkey);

        assert_eq!(addr.address_type(), AddressType::Normal);
        assert_eq!(addr.body(), &keccak256(&pubkey[1..]).0[12..]);
        assert_eq!(keypair.address(), addr);
    }

    #[test]
    fn test_lock_address_is_ordered() {
        let a = Address::with_type(AddressType::Normal, &[1u8; 20]);
        let b = Address::with_type(AddressType::Normal, &[2u8; 20]);
        let ab = lock_address(&a, &b);

        assert_eq!(ab.address_type(), AddressType::Cross);
        assert_ne!(ab, lock_address(&b, &a));
    }

    #[test]
    fn test_contract_address_depends_on_nonce() {
        let caller = Address::with_type(AddressType::Normal, &[5u8; 20]);
        let first = contract_address(&caller, 0);

        assert_eq!(first.address_type(), AddressType::ContractCall);
        assert_ne!(first, contract_address(&caller, 1));
    }
}
