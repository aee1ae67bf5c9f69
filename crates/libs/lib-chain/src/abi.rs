//! # Contract ABI Subset
//!
//! Solidity ABI encoding for the handful of argument and return types the
//! order contract uses: `address`, `uint256`, `uint8`, `bool` and `string`.

use sha3::{Digest, Keccak256};

use crate::error::ChainError;

const WORD: usize = 32;

// region: --- Contract signatures

pub const CREATE_ORDER: &str = "createOrder(address,string,uint256)";
pub const GET_ORDER: &str = "getOrder(uint256)";
pub const GET_ORDER_COUNT: &str = "getOrderCount()";
pub const APPROVE_ORDER: &str = "approveOrder(uint256)";
pub const COMPLETE_ORDER: &str = "completeOrder(uint256)";
pub const REGISTER_WALLET: &str = "registerWallet(string,uint8)";
pub const GET_ENTITY: &str = "getEntity(address)";
pub const IS_ENTITY_REGISTERED: &str = "isEntityRegistered(address)";

// endregion: --- Contract signatures

/// One call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Address([u8; 20]),
    Uint(u128),
    String(String),
}

/// First four bytes of the keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Parse a `0x`-prefixed 20-byte address.
pub fn parse_address(address: &str) -> Result<[u8; 20], ChainError> {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| ChainError::Decode(format!("address {} lacks 0x prefix", address)))?;
    let bytes = hex::decode(digits).map_err(|e| ChainError::Decode(format!("address {}: {}", address, e)))?;
    bytes
        .try_into()
        .map_err(|_| ChainError::Decode(format!("address {} is not 20 bytes", address)))
}

pub fn format_address(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Encode a call: selector followed by the head/tail argument encoding.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut head = Vec::with_capacity(args.len() * WORD);
    let mut tail = Vec::new();
    let head_len = args.len() * WORD;

    for arg in args {
        match arg {
            Token::Address(bytes) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(bytes);
                head.extend_from_slice(&word);
            }
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::String(text) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                tail.extend_from_slice(&uint_word(text.len() as u128));
                tail.extend_from_slice(text.as_bytes());
                let padding = (WORD - text.len() % WORD) % WORD;
                tail.extend(std::iter::repeat(0u8).take(padding));
            }
        }
    }

    let mut data = Vec::with_capacity(4 + head.len() + tail.len());
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&head);
    data.extend_from_slice(&tail);
    data
}

/// Hex form of [`encode_call`], ready for the `data` field of a call object.
pub fn encode_call_hex(signature: &str, args: &[Token]) -> String {
    format!("0x{}", hex::encode(encode_call(signature, args)))
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Reads head words (and the dynamic data they point to) out of return data.
pub struct AbiReader {
    data: Vec<u8>,
}

impl AbiReader {
    pub fn from_hex(raw: &str) -> Result<Self, ChainError> {
        let digits = raw.trim_start_matches("0x");
        let data = hex::decode(digits).map_err(|e| ChainError::Decode(format!("return data: {}", e)))?;
        Ok(Self { data })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn word_at(&self, offset: usize) -> Result<&[u8], ChainError> {
        offset
            .checked_add(WORD)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| ChainError::Decode(format!("return data too short for word at {}", offset)))
    }

    fn word(&self, index: usize) -> Result<&[u8], ChainError> {
        let offset = index
            .checked_mul(WORD)
            .ok_or_else(|| ChainError::Decode(format!("word index {} out of range", index)))?;
        self.word_at(offset)
    }

    pub fn uint(&self, index: usize) -> Result<u128, ChainError> {
        word_to_uint(self.word(index)?)
    }

    /// A uint that must fit in 64 bits.
    pub fn u64(&self, index: usize) -> Result<u64, ChainError> {
        let value = self.uint(index)?;
        u64::try_from(value).map_err(|_| ChainError::Decode(format!("value {} exceeds u64", value)))
    }

    pub fn u8(&self, index: usize) -> Result<u8, ChainError> {
        let value = self.uint(index)?;
        u8::try_from(value).map_err(|_| ChainError::Decode(format!("value {} exceeds uint8", value)))
    }

    pub fn bool(&self, index: usize) -> Result<bool, ChainError> {
        match self.uint(index)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ChainError::Decode(format!("invalid bool word {}", other))),
        }
    }

    pub fn address(&self, index: usize) -> Result<String, ChainError> {
        let word = self.word(index)?;
        if word[..12].iter().any(|b| *b != 0) {
            return Err(ChainError::Decode("address word has dirty high bytes".to_string()));
        }
        Ok(format_address(&word[12..]))
    }

    /// A `string` whose offset sits in head word `index`.
    pub fn string(&self, index: usize) -> Result<String, ChainError> {
        let offset = usize::try_from(self.uint(index)?)
            .map_err(|_| ChainError::Decode("string offset overflow".to_string()))?;
        let len = usize::try_from(word_to_uint(self.word_at(offset)?)?)
            .map_err(|_| ChainError::Decode("string length overflow".to_string()))?;
        // word_at succeeded, so offset + WORD cannot overflow.
        let start = offset + WORD;
        let bytes = start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| ChainError::Decode("string runs past return data".to_string()))?;
        String::from_utf8(bytes.to_vec()).map_err(|e| ChainError::Decode(format!("string is not UTF-8: {}", e)))
    }
}

fn word_to_uint(word: &[u8]) -> Result<u128, ChainError> {
    if word[..16].iter().any(|b| *b != 0) {
        return Err(ChainError::Decode("uint256 value exceeds 128 bits".to_string()));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        // Well-known ERC-20 selectors validate the hashing.
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn test_encode_static_args() {
        let addr = parse_address("0x00000000000000000000000000000000000000ff").unwrap();
        let data = encode_call("balanceOf(address)", &[Token::Address(addr)]);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(data[4 + 31], 0xff);
    }

    #[test]
    fn test_encode_string_layout() {
        let seller = parse_address(&format!("0x{}", "11".repeat(20))).unwrap();
        let data = encode_call(
            CREATE_ORDER,
            &[Token::Address(seller), Token::String("Brake Pad".into()), Token::Uint(25)],
        );
        let body = &data[4..];

        // three head words, then length word and one padded data word
        assert_eq!(body.len(), 5 * 32);
        assert_eq!(body[32 + 31], 0x60); // string offset = 3 words
        assert_eq!(body[2 * 32 + 31], 25);
        assert_eq!(body[3 * 32 + 31], 9); // "Brake Pad".len()
        assert_eq!(&body[4 * 32..4 * 32 + 9], b"Brake Pad");
        assert!(body[4 * 32 + 9..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_reader_decodes_tuple_with_string() {
        // (uint256 7, string "Axle", bool true)
        let mut raw = Vec::new();
        raw.extend_from_slice(&uint_word(7));
        raw.extend_from_slice(&uint_word(96));
        raw.extend_from_slice(&uint_word(1));
        raw.extend_from_slice(&uint_word(4));
        let mut text = [0u8; 32];
        text[..4].copy_from_slice(b"Axle");
        raw.extend_from_slice(&text);

        let reader = AbiReader::from_hex(&format!("0x{}", hex::encode(raw))).unwrap();
        assert_eq!(reader.u64(0).unwrap(), 7);
        assert_eq!(reader.string(1).unwrap(), "Axle");
        assert!(reader.bool(2).unwrap());
    }

    #[test]
    fn test_reader_short_data() {
        let reader = AbiReader::from_hex("0x").unwrap();
        assert!(reader.is_empty());
        assert!(reader.uint(0).is_err());
    }

    #[test]
    fn test_parse_address_errors() {
        assert!(parse_address("1234").is_err());
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzz00000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn test_malformed_string_words_are_rejected() {
        // offset word pointing near usize::MAX
        let raw = format!("0x{}{}", "0".repeat(48), "ffffffffffffffff");
        let reader = AbiReader::from_hex(&raw).unwrap();
        assert!(matches!(reader.string(0), Err(ChainError::Decode(_))));

        // valid offset, length word near usize::MAX
        let raw = format!("0x{:064x}{}{}", 32, "0".repeat(48), "ffffffffffffffff");
        let reader = AbiReader::from_hex(&raw).unwrap();
        assert!(matches!(reader.string(0), Err(ChainError::Decode(_))));

        assert!(matches!(reader.uint(usize::MAX), Err(ChainError::Decode(_))));
    }
}
