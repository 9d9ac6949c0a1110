//! 4b6b symbol encoding and decoding.
//!
//! Every nibble that goes over the air is replaced by one of 16 six-bit
//! symbols. Each symbol carries exactly three `1` bits, so the line stays DC
//! balanced and no symbol sequence holds a level long enough for the receiver's
//! PLL to lose phase. The table is the VirtualWire one; it is a design
//! constant shared by both directions.
//!
//! ## Functions
//!
//! - [`encode_nibble`] / [`decode_symbol`]: one nibble to/from one symbol
//! - [`encode_4b6b`]: a byte to a symbol pair, high nibble first
//! - [`decode_6b4b`]: a symbol pair back to a byte
//!
//! Only 16 of the 64 possible six-bit values are valid; decoding anything else
//! returns `None`, which the framer treats as loss of synchronization.

/// Symbol for each nibble value.
pub static SYMBOLS: [u8; 16] = [
    0xd, 0xe, 0x13, 0x15, 0x16, 0x19, 0x1a, 0x1c, 0x23, 0x25, 0x26, 0x29, 0x2a, 0x2c, 0x32, 0x34,
];

const N: Option<u8> = None;

#[rustfmt::skip]
static REV_SYMBOLS: [Option<u8>; 64] = [
    N, N, N, N, N, N, N, N, N, N, N, N, N, Some(0), Some(1), N,
    N, N, N, Some(2), N, Some(3), Some(4), N, N, Some(5), Some(6), N, Some(7), N, N, N,
    N, N, N, Some(8), N, Some(9), Some(10), N, N, Some(11), Some(12), N, Some(13), N, N, N,
    N, N, Some(14), N, Some(15), N, N, N, N, N, N, N, N, N, N, N,
];

/// Returns the symbol for the low four bits of `nibble`.
pub fn encode_nibble(nibble: u8) -> u8 {
    SYMBOLS[usize::from(nibble & 0x0f)]
}

/// Returns the nibble a six-bit symbol stands for, or `None` if it is not a
/// valid symbol.
pub fn decode_symbol(symbol: u8) -> Option<u8> {
    REV_SYMBOLS.get(usize::from(symbol)).copied().flatten()
}

/// Encodes an 8-bit byte into two 6-bit symbols using 4b6b encoding.
pub fn encode_4b6b(byte: u8) -> [u8; 2] {
    [encode_nibble(byte >> 4), encode_nibble(byte)]
}

/// Decodes two 6-bit symbols back into the original byte.
///
/// Returns `None` if either symbol is invalid (not part of the encoding table).
pub fn decode_6b4b(sym_hi: u8, sym_lo: u8) -> Option<u8> {
    let high = decode_symbol(sym_hi)?;
    let low = decode_symbol(sym_lo)?;
    Some((high << 4) | low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_symbol_is_dc_balanced() {
        for sym in SYMBOLS {
            assert_eq!(sym.count_ones(), 3, "symbol {sym:#04x}");
            assert!(sym < 64);
        }
    }

    #[test]
    fn test_reverse_table_inverts_forward_table() {
        for nibble in 0..16u8 {
            assert_eq!(decode_symbol(encode_nibble(nibble)), Some(nibble));
        }
    }

    #[test]
    fn test_exactly_48_six_bit_values_are_invalid() {
        let invalid = (0..64u8).filter(|&v| decode_symbol(v).is_none()).count();
        assert_eq!(invalid, 48);
    }

    #[test]
    fn test_out_of_range_symbol_is_invalid() {
        assert_eq!(decode_symbol(0x40), None);
        assert_eq!(decode_symbol(0xff), None);
    }

    #[test]
    fn test_encode_byte_high_nibble_first() {
        assert_eq!(encode_4b6b(0x41), [0x16, 0xe]);
        assert_eq!(decode_6b4b(0x16, 0xe), Some(0x41));
    }

    #[test]
    fn test_decode_rejects_invalid_half() {
        assert_eq!(decode_6b4b(0x16, 0x00), None);
        assert_eq!(decode_6b4b(0x3f, 0xe), None);
    }
}
