/// Initial value of the running CRC.
pub(crate) const CRC_INIT: u16 = 0xffff;

/// One byte step of the reflected CRC-CCITT (polynomial 0x8408), as used by
/// VirtualWire's frame check sequence.
pub(crate) fn crc_ccitt_update(crc: u16, data: u8) -> u16 {
    let mut d = u16::from(data);
    d ^= lo8(crc);
    d ^= d << 4;
    d &= 0xff; // only the low byte carries into the next step

    ((d << 8) | hi8(crc)) ^ (d >> 4) ^ (d << 3)
}

/// Frame check sequence over the length byte and payload.
///
/// The ones' complement of the running CRC; it goes on the wire low byte first.
pub(crate) fn frame_check_sequence(length: u8, payload: &[u8]) -> u16 {
    let crc = payload
        .iter()
        .fold(crc_ccitt_update(CRC_INIT, length), |crc, &b| {
            crc_ccitt_update(crc, b)
        });
    !crc
}

pub(crate) fn lo8(x: u16) -> u16 {
    x & 0xff
}

pub(crate) fn hi8(x: u16) -> u16 {
    x >> 8
}
