// RLP - Recursive Length Prefix encoding
// Only the encoding side is needed: transactions are built here and decoded by the node

/// Accumulates encoded items and wraps them as an RLP list
#[derive(Clone, Debug, Default)]
pub struct RlpList {
    payload: Vec<u8>,
}

impl RlpList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a byte string
    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        encode_bytes(bytes, &mut self.payload);
        self
    }

    /// Append an unsigned integer (big-endian, no leading zeros)
    pub fn append_u64(&mut self, value: u64) -> &mut Self {
        self.append_bytes(trim_leading_zeros(&value.to_be_bytes()))
    }

    /// Append an unsigned 128-bit integer
    pub fn append_u128(&mut self, value: u128) -> &mut Self {
        self.append_bytes(trim_leading_zeros(&value.to_be_bytes()))
    }

    /// Append a 256-bit big-endian scalar (e.g. a signature component)
    pub fn append_scalar(&mut self, value: &[u8; 32]) -> &mut Self {
        self.append_bytes(trim_leading_zeros(value))
    }

    /// Finish the list: prefix + concatenated items
    pub fn finish(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 9);
        encode_length(self.payload.len(), 0xc0, &mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Encode a single byte string into `out`
pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        out.push(bytes[0]);
    } else {
        encode_length(bytes.len(), 0x80, out);
        out.extend_from_slice(bytes);
    }
}

fn encode_length(len: usize, offset: u8, out: &mut Vec<u8>) {
    if len < 56 {
        out.push(offset + len as u8);
    } else {
        let be = (len as u64).to_be_bytes();
        let len_bytes = trim_leading_zeros(&be);
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
