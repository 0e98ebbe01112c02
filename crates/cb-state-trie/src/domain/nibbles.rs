// =============================================================================
// NIBBLES: Half-byte key paths
// =============================================================================

/// Nibble path for trie traversal.
///
/// Every key byte becomes two nibbles (high half first), so a 32-byte
/// transaction id walks 64 levels at most.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nibbles(pub Vec<u8>);

impl Nibbles {
    /// Expands raw key bytes into nibbles.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut nibbles = Vec::with_capacity(bytes.len() * 2);
        for byte in bytes {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }
        Nibbles(nibbles)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the shared prefix with `other`.
    pub fn common_prefix_len(&self, other: &[u8]) -> usize {
        self.0
            .iter()
            .zip(other.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Hex-prefix (compact) encoding used inside leaf and extension nodes.
    ///
    /// Flag nibble: bit 1 marks a leaf, bit 0 an odd path length. Odd paths
    /// carry their first nibble next to the flag; even paths pad with zero.
    pub fn encode_hex_prefix(&self, is_leaf: bool) -> Vec<u8> {
        let odd = self.len() % 2 == 1;
        let flag = (u8::from(is_leaf) << 1) | u8::from(odd);

        let mut out = Vec::with_capacity(self.len() / 2 + 1);
        let rest = if odd {
            out.push((flag << 4) | self.0[0]);
            &self.0[1..]
        } else {
            out.push(flag << 4);
            &self.0[..]
        };
        out.extend(rest.chunks(2).map(|pair| (pair[0] << 4) | pair[1]));
        out
    }

    /// Inverse of [`Nibbles::encode_hex_prefix`], returning the path and the leaf flag.
    pub fn decode_hex_prefix(encoded: &[u8]) -> (Self, bool) {
        let Some((&first, rest)) = encoded.split_first() else {
            return (Nibbles::default(), false);
        };
        let flag = first >> 4;
        let mut nibbles = Vec::with_capacity(rest.len() * 2 + 1);
        if flag & 1 == 1 {
            nibbles.push(first & 0x0F);
        }
        for byte in rest {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }
        (Nibbles(nibbles), flag & 2 == 2)
    }
}

impl From<&[u8]> for Nibbles {
    fn from(nibbles: &[u8]) -> Self {
        Nibbles(nibbles.to_vec())
    }
}
